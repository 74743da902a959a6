use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis along which ranks advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
	/// Ranks stack downwards; `TB`.
	#[default]
	#[serde(rename = "TB")]
	TopToBottom,
	/// Ranks advance to the right; `LR`.
	#[serde(rename = "LR")]
	LeftToRight,
}

impl Direction {
	/// True for [`Direction::LeftToRight`].
	pub fn is_horizontal(self) -> bool {
		matches!(self, Direction::LeftToRight)
	}

	/// Side incoming connectors attach to.
	pub fn target_side(self) -> Side {
		if self.is_horizontal() {
			Side::Left
		} else {
			Side::Top
		}
	}

	/// Side outgoing connectors attach to.
	pub fn source_side(self) -> Side {
		if self.is_horizontal() {
			Side::Right
		} else {
			Side::Bottom
		}
	}

	/// The other direction.
	pub fn toggled(self) -> Self {
		match self {
			Direction::TopToBottom => Direction::LeftToRight,
			Direction::LeftToRight => Direction::TopToBottom,
		}
	}

	/// Short label, `TB` or `LR`.
	pub fn as_str(self) -> &'static str {
		match self {
			Direction::TopToBottom => "TB",
			Direction::LeftToRight => "LR",
		}
	}
}

/// Edge of a node box where connection lines attach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	/// Upper edge.
	Top,
	/// Lower edge.
	Bottom,
	/// Left edge.
	Left,
	/// Right edge.
	Right,
}

/// Logical size every node occupies during layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
	/// Box width in graph units.
	pub width: f64,
	/// Box height in graph units.
	pub height: f64,
}

impl Default for Footprint {
	fn default() -> Self {
		Self {
			width: 172.0,
			height: 36.0,
		}
	}
}

/// Why a [`LayoutConfig`] was rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
	/// Width or height is zero, negative, or not finite.
	#[error("footprint must be positive and finite, got {width}x{height}")]
	InvalidFootprint {
		/// Rejected width.
		width: f64,
		/// Rejected height.
		height: f64,
	},
	/// A spacing is negative or not finite.
	#[error("{name} spacing must be non-negative and finite, got {value}")]
	InvalidSpacing {
		/// `node` or `rank`.
		name: &'static str,
		/// Rejected value.
		value: f64,
	},
}

/// Parameters handed to the layout adapter on every call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
	/// Axis ranks advance along.
	pub direction: Direction,
	/// Size registered for every node.
	pub footprint: Footprint,
	/// Gap between neighbouring nodes of the same rank.
	pub node_spacing: f64,
	/// Gap between consecutive ranks.
	pub rank_spacing: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			direction: Direction::TopToBottom,
			footprint: Footprint::default(),
			node_spacing: 50.0,
			rank_spacing: 50.0,
		}
	}
}

impl LayoutConfig {
	/// Replaces the direction.
	pub fn with_direction(mut self, direction: Direction) -> Self {
		self.direction = direction;
		self
	}

	/// Replaces the node footprint.
	pub fn with_footprint(mut self, width: f64, height: f64) -> Self {
		self.footprint = Footprint { width, height };
		self
	}

	/// Replaces the gap within a rank.
	pub fn with_node_spacing(mut self, spacing: f64) -> Self {
		self.node_spacing = spacing;
		self
	}

	/// Replaces the gap between ranks.
	pub fn with_rank_spacing(mut self, spacing: f64) -> Self {
		self.rank_spacing = spacing;
		self
	}

	/// Checks the footprint is positive and both spacings are non-negative, all finite.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let Footprint { width, height } = self.footprint;
		if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
			return Err(ConfigError::InvalidFootprint { width, height });
		}
		for (name, value) in [("node", self.node_spacing), ("rank", self.rank_spacing)] {
			if !value.is_finite() || value < 0.0 {
				return Err(ConfigError::InvalidSpacing { name, value });
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn connector_sides_follow_direction() {
		assert_eq!(Direction::TopToBottom.target_side(), Side::Top);
		assert_eq!(Direction::TopToBottom.source_side(), Side::Bottom);
		assert_eq!(Direction::LeftToRight.target_side(), Side::Left);
		assert_eq!(Direction::LeftToRight.source_side(), Side::Right);
	}

	#[test]
	fn default_config_is_valid() {
		let config = LayoutConfig::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.footprint, Footprint { width: 172.0, height: 36.0 });
	}

	#[test]
	fn rejects_degenerate_footprint() {
		let config = LayoutConfig::default().with_footprint(0.0, 36.0);
		assert_eq!(
			config.validate(),
			Err(ConfigError::InvalidFootprint { width: 0.0, height: 36.0 })
		);
	}

	#[test]
	fn rejects_negative_spacing() {
		let config = LayoutConfig::default().with_rank_spacing(-1.0);
		assert!(matches!(
			config.validate(),
			Err(ConfigError::InvalidSpacing { name: "rank", .. })
		));
	}

	#[test]
	fn direction_serializes_as_rankdir() {
		assert_eq!(serde_json::to_string(&Direction::LeftToRight).unwrap(), "\"LR\"");
		assert_eq!(serde_json::to_string(&Side::Bottom).unwrap(), "\"bottom\"");
	}
}
