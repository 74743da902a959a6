//! Layered (Sugiyama-style) graph layout.
//!
//! Phases:
//!   1. Cycle breaking (depth-first, back edges reversed)
//!   2. Ranking (longest path, sources pulled towards their successors)
//!   3. Normalization (dummy vertices on long edges)
//!   4. Ordering (barycenter sweeps, fewest crossings kept)
//!   5. Positioning (median pull with order-preserving separation)
//!
//! Every phase walks vertices in registration order, so the same input always
//! produces the same coordinates.

use std::collections::{HashMap, HashSet};

use petgraph::Direction::{Incoming, Outgoing};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsEvent, depth_first_search};

use super::config::Direction;

const ORDER_SWEEPS: usize = 8;
const POSITION_PASSES: usize = 6;

/// Center coordinate produced by [`LayeredGraph::solve`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal center.
	pub x: f64,
	/// Vertical center.
	pub y: f64,
}

#[derive(Clone, Debug)]
struct Vertex {
	id: String,
	width: f64,
	height: f64,
}

/// Graph under construction for a single layout run.
#[derive(Clone, Debug)]
pub struct LayeredGraph {
	direction: Direction,
	node_spacing: f64,
	rank_spacing: f64,
	graph: DiGraph<Vertex, ()>,
	index: HashMap<String, NodeIndex>,
}

/// Result of a layout run, keyed by node id.
#[derive(Clone, Debug, Default)]
pub struct Solution {
	centers: HashMap<String, Point>,
	width: f64,
	height: f64,
}

impl Solution {
	/// Center of the node registered as `id`, if it was laid out.
	pub fn center(&self, id: &str) -> Option<Point> {
		self.centers.get(id).copied()
	}

	/// Number of placed nodes.
	pub fn len(&self) -> usize {
		self.centers.len()
	}

	/// True when nothing was laid out.
	pub fn is_empty(&self) -> bool {
		self.centers.is_empty()
	}

	/// Extent of the drawing along x.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Extent of the drawing along y.
	pub fn height(&self) -> f64 {
		self.height
	}
}

impl LayeredGraph {
	/// Empty graph flowing in `direction`, with 50px node and rank spacing.
	pub fn new(direction: Direction) -> Self {
		Self {
			direction,
			node_spacing: 50.0,
			rank_spacing: 50.0,
			graph: DiGraph::new(),
			index: HashMap::new(),
		}
	}

	/// Gap between neighbours within a rank.
	pub fn node_spacing(mut self, spacing: f64) -> Self {
		self.node_spacing = spacing;
		self
	}

	/// Gap between consecutive ranks.
	pub fn rank_spacing(mut self, spacing: f64) -> Self {
		self.rank_spacing = spacing;
		self
	}

	/// Registers a node, replacing the footprint if the id is already known.
	pub fn add_node(&mut self, id: &str, width: f64, height: f64) {
		if let Some(&idx) = self.index.get(id) {
			self.graph[idx].width = width;
			self.graph[idx].height = height;
			return;
		}
		let idx = self.graph.add_node(Vertex {
			id: id.to_string(),
			width,
			height,
		});
		self.index.insert(id.to_string(), idx);
	}

	/// Registers a directed arc. Returns false if either end is unknown.
	pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
		match (self.index.get(source), self.index.get(target)) {
			(Some(&s), Some(&t)) => {
				self.graph.add_edge(s, t, ());
				true
			}
			_ => false,
		}
	}

	/// Registered nodes.
	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	/// Registered arcs, duplicates and self loops included.
	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	/// Lays the graph out. Never fails; an empty graph gives an empty solution.
	pub fn solve(&self) -> Solution {
		if self.graph.node_count() == 0 {
			return Solution::default();
		}

		let arcs = self.acyclic_arcs();
		let ranks = rank(self.graph.node_count(), &arcs);
		let mut layered = Normalized::build(self, &ranks, &arcs);
		layered.order();
		let breadth = layered.position(self.node_spacing);
		self.place(&layered, &breadth)
	}

	/// Breadth (across ranks) and depth (along ranks) of a real vertex.
	fn extent(&self, v: usize) -> (f64, f64) {
		let Vertex { width, height, .. } = self.graph[NodeIndex::new(v)];
		if self.direction.is_horizontal() {
			(height, width)
		} else {
			(width, height)
		}
	}

	/// Deduplicated arcs in registration order, with self loops dropped and
	/// depth-first back edges reversed.
	fn acyclic_arcs(&self) -> Vec<(usize, usize)> {
		let mut seen = HashSet::new();
		let simple = self.graph.filter_map(
			|_, _| Some(()),
			|e, _| {
				let (s, t) = self.graph.edge_endpoints(e)?;
				(s != t && seen.insert((s, t))).then_some(())
			},
		);

		let mut back = HashSet::new();
		depth_first_search(&simple, simple.node_indices(), |event| {
			if let DfsEvent::BackEdge(u, v) = event {
				back.insert((u, v));
			}
		});

		let mut kept = HashSet::new();
		simple
			.raw_edges()
			.iter()
			.map(|e| {
				let (s, t) = (e.source(), e.target());
				if back.contains(&(s, t)) { (t, s) } else { (s, t) }
			})
			.filter(|&arc| kept.insert(arc))
			.map(|(s, t)| (s.index(), t.index()))
			.collect()
	}

	fn place(&self, layered: &Normalized, breadth: &[f64]) -> Solution {
		let real = self.graph.node_count();
		let mut rank_depth = vec![0.0f64; layered.layers.len()];
		for v in 0..real {
			let (_, depth) = self.extent(v);
			let r = layered.rank[v];
			rank_depth[r] = rank_depth[r].max(depth);
		}
		let mut rank_offset = Vec::with_capacity(rank_depth.len());
		let mut offset = 0.0;
		for depth in &rank_depth {
			rank_offset.push(offset);
			offset += depth + self.rank_spacing;
		}

		let min_edge = (0..real)
			.map(|v| breadth[v] - self.extent(v).0 / 2.0)
			.fold(f64::INFINITY, f64::min);

		let mut solution = Solution::default();
		for idx in self.graph.node_indices() {
			let (v, vertex) = (idx.index(), &self.graph[idx]);
			let r = layered.rank[v];
			let (b, d) = (breadth[v] - min_edge, rank_offset[r] + rank_depth[r] / 2.0);
			let center = if self.direction.is_horizontal() {
				Point { x: d, y: b }
			} else {
				Point { x: b, y: d }
			};
			solution.width = solution.width.max(center.x + vertex.width / 2.0);
			solution.height = solution.height.max(center.y + vertex.height / 2.0);
			solution.centers.insert(vertex.id.clone(), center);
		}
		solution
	}
}

/// Longest-path ranking; sources are then pulled down next to their nearest successor.
fn rank(n: usize, arcs: &[(usize, usize)]) -> Vec<usize> {
	let mut dag: DiGraph<(), ()> = DiGraph::with_capacity(n, arcs.len());
	for _ in 0..n {
		dag.add_node(());
	}
	for &(s, t) in arcs {
		dag.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
	}
	// acyclic once back edges are reversed
	let topo = toposort(&dag, None).unwrap_or_else(|_| dag.node_indices().collect());

	let mut ranks = vec![0usize; n];
	for &v in &topo {
		for w in dag.neighbors_directed(v, Outgoing) {
			ranks[w.index()] = ranks[w.index()].max(ranks[v.index()] + 1);
		}
	}
	for &v in topo.iter().rev() {
		if dag.neighbors_directed(v, Incoming).next().is_some() {
			continue;
		}
		if let Some(min) = dag.neighbors_directed(v, Outgoing).map(|w| ranks[w.index()]).min() {
			ranks[v.index()] = min.saturating_sub(1).max(ranks[v.index()]);
		}
	}

	let base = ranks.iter().copied().min().unwrap_or(0);
	ranks.iter().map(|r| r - base).collect()
}

/// Proper layered graph: every arc spans exactly one rank.
struct Normalized {
	/// Real vertices come first, then dummies.
	rank: Vec<usize>,
	/// Breadth of each vertex; zero for dummies.
	breadth: Vec<f64>,
	real: usize,
	up: Vec<Vec<usize>>,
	down: Vec<Vec<usize>>,
	layers: Vec<Vec<usize>>,
}

impl Normalized {
	fn build(graph: &LayeredGraph, ranks: &[usize], dag: &[(usize, usize)]) -> Self {
		let real = ranks.len();
		let mut rank = ranks.to_vec();
		let mut breadth: Vec<f64> = (0..real).map(|v| graph.extent(v).0).collect();
		let mut up: Vec<Vec<usize>> = vec![Vec::new(); real];
		let mut down: Vec<Vec<usize>> = vec![Vec::new(); real];

		for &(s, t) in dag {
			let mut prev = s;
			for r in (rank[s] + 1)..rank[t] {
				let dummy = rank.len();
				rank.push(r);
				breadth.push(0.0);
				up.push(vec![prev]);
				down.push(Vec::new());
				down[prev].push(dummy);
				prev = dummy;
			}
			down[prev].push(t);
			up[t].push(prev);
		}

		let layer_count = rank.iter().copied().max().unwrap_or(0) + 1;
		let mut normalized = Self {
			rank,
			breadth,
			real,
			up,
			down,
			layers: vec![Vec::new(); layer_count],
		};
		normalized.initial_order();
		normalized
	}

	/// Depth-first from vertices in (rank, registration) order.
	fn initial_order(&mut self) {
		let total = self.rank.len();
		let mut starts: Vec<usize> = (0..total).collect();
		starts.sort_by_key(|&v| self.rank[v]);

		let mut visited = vec![false; total];
		for start in starts {
			let mut stack = vec![start];
			while let Some(v) = stack.pop() {
				if visited[v] {
					continue;
				}
				visited[v] = true;
				self.layers[self.rank[v]].push(v);
				stack.extend(self.down[v].iter().rev().copied().filter(|&w| !visited[w]));
			}
		}
	}

	fn order(&mut self) {
		let mut best = self.layers.clone();
		let mut best_crossings = self.crossings();
		for sweep in 0..ORDER_SWEEPS {
			if best_crossings == 0 {
				break;
			}
			if sweep % 2 == 0 {
				for r in 1..self.layers.len() {
					self.reorder(r, r - 1, true);
				}
			} else {
				for r in (0..self.layers.len().saturating_sub(1)).rev() {
					self.reorder(r, r + 1, false);
				}
			}
			let crossings = self.crossings();
			if crossings < best_crossings {
				best_crossings = crossings;
				best = self.layers.clone();
			}
		}
		self.layers = best;
	}

	/// Sorts `layer` by the barycenter of its neighbours in `fixed`.
	fn reorder(&mut self, layer: usize, fixed: usize, use_up: bool) {
		let slot = slots(&self.layers[fixed], self.rank.len());
		let mut keyed: Vec<(f64, usize)> = self.layers[layer]
			.iter()
			.enumerate()
			.map(|(i, &v)| {
				let neighbours = if use_up { &self.up[v] } else { &self.down[v] };
				let key = if neighbours.is_empty() {
					i as f64
				} else {
					neighbours.iter().map(|&w| slot[w] as f64).sum::<f64>() / neighbours.len() as f64
				};
				(key, v)
			})
			.collect();
		keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
		self.layers[layer] = keyed.into_iter().map(|(_, v)| v).collect();
	}

	fn crossings(&self) -> usize {
		let mut total = 0;
		for r in 0..self.layers.len().saturating_sub(1) {
			let (upper, lower) = (
				slots(&self.layers[r], self.rank.len()),
				slots(&self.layers[r + 1], self.rank.len()),
			);
			let mut segments: Vec<(usize, usize)> = Vec::new();
			for &v in &self.layers[r] {
				segments.extend(self.down[v].iter().map(|&w| (upper[v], lower[w])));
			}
			for (i, a) in segments.iter().enumerate() {
				for b in &segments[i + 1..] {
					if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
						total += 1;
					}
				}
			}
		}
		total
	}

	fn separation(&self, a: usize, b: usize, spacing: f64) -> f64 {
		let gap = if a >= self.real || b >= self.real {
			spacing / 2.0
		} else {
			spacing
		};
		(self.breadth[a] + self.breadth[b]) / 2.0 + gap
	}

	/// Breadth-axis centers for every vertex (real and dummy).
	fn position(&self, spacing: f64) -> Vec<f64> {
		let mut center = vec![0.0f64; self.rank.len()];
		for layer in &self.layers {
			let mut cursor = 0.0;
			for (i, &v) in layer.iter().enumerate() {
				if i > 0 {
					cursor += self.separation(layer[i - 1], v, spacing);
				}
				center[v] = cursor;
			}
		}

		for pass in 0..POSITION_PASSES {
			let downward = pass % 2 == 0;
			let ranks: Vec<usize> = if downward {
				(1..self.layers.len()).collect()
			} else {
				(0..self.layers.len().saturating_sub(1)).rev().collect()
			};
			for r in ranks {
				let layer = &self.layers[r];
				let desired: Vec<f64> = layer
					.iter()
					.map(|&v| {
						let neighbours = if downward { &self.up[v] } else { &self.down[v] };
						median(neighbours.iter().map(|&w| center[w]).collect()).unwrap_or(center[v])
					})
					.collect();
				for (v, c) in self.balance(layer, &desired, spacing) {
					center[v] = c;
				}
			}
		}
		center
	}

	/// Closest placement to `desired` that keeps order and separation; the
	/// mean of a left-packed and a right-packed sweep.
	fn balance(&self, layer: &[usize], desired: &[f64], spacing: f64) -> Vec<(usize, f64)> {
		let n = layer.len();
		let mut left = desired.to_vec();
		for i in 1..n {
			let min = left[i - 1] + self.separation(layer[i - 1], layer[i], spacing);
			left[i] = left[i].max(min);
		}
		let mut right = desired.to_vec();
		for i in (0..n.saturating_sub(1)).rev() {
			let max = right[i + 1] - self.separation(layer[i], layer[i + 1], spacing);
			right[i] = right[i].min(max);
		}
		layer
			.iter()
			.enumerate()
			.map(|(i, &v)| (v, (left[i] + right[i]) / 2.0))
			.collect()
	}
}

fn slots(layer: &[usize], total: usize) -> Vec<usize> {
	let mut slot = vec![0usize; total];
	for (i, &v) in layer.iter().enumerate() {
		slot[v] = i;
	}
	slot
}

fn median(mut values: Vec<f64>) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	values.sort_by(f64::total_cmp);
	let mid = values.len() / 2;
	Some(if values.len() % 2 == 0 {
		(values[mid - 1] + values[mid]) / 2.0
	} else {
		values[mid]
	})
}
