/// Visibility of the editor window and the node that last toggled it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkspaceState {
	open: bool,
	node_id: Option<String>,
}

impl WorkspaceState {
	/// Any node click flips visibility and remembers the clicked node.
	pub fn toggle(&mut self, node_id: String) {
		self.node_id = Some(node_id);
		self.open = !self.open;
	}

	pub fn close(&mut self) {
		self.open = false;
	}

	pub fn is_open(&self) -> bool {
		self.open
	}

	pub fn node_id(&self) -> Option<&str> {
		self.node_id.as_deref()
	}
}

/// Placement of the floating window in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowFrame {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl WindowFrame {
	/// A `width` x `height` frame centered in the viewport, shrunk to fit.
	pub fn centered(width: f64, height: f64, viewport_w: f64, viewport_h: f64) -> Self {
		let (width, height) = (width.min(viewport_w), height.min(viewport_h));
		Self {
			x: ((viewport_w - width) / 2.0).max(0.0),
			y: ((viewport_h - height) / 2.0).max(0.0),
			width,
			height,
		}
	}

	/// Moves by (dx, dy), keeping the title bar reachable.
	pub fn dragged(self, dx: f64, dy: f64, viewport_w: f64, viewport_h: f64) -> Self {
		const GRIP: f64 = 40.0;
		let max_x = (viewport_w - GRIP).max(0.0);
		Self {
			x: (self.x + dx).clamp((GRIP - self.width).min(max_x), max_x),
			y: (self.y + dy).clamp(0.0, (viewport_h - GRIP).max(0.0)),
			..self
		}
	}

	pub fn style(&self) -> String {
		format!(
			"left: {}px; top: {}px; width: {}px; height: {}px;",
			self.x, self.y, self.width, self.height
		)
	}
}
