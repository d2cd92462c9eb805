//! Layout engine - places task cards on a 2D plane without overlap
//!
//! Every node owns two child columns: one to its right and one below it,
//! indented. Which relation goes where is the [`Convention`]. Columns stack
//! their children top to bottom, advancing by each child's consumed extent,
//! so sibling subtrees never share space. Coordinates grow right and down.

use super::task::TaskId;
use super::TaskStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_left(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    pub fn mid_right(&self) -> Point {
        Point::new(self.right(), self.y + self.height / 2.0)
    }

    pub fn mid_bottom(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.bottom())
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when the two rectangles share a region of positive area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Space consumed by a placed subtree, measured from its origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

/// Direction a child column grows away from its parent card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Down,
}

/// Which relation maps to which axis
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// Subtasks indent below, workflow continues rightward
    A,
    /// Subtasks continue rightward, workflow continues below
    #[default]
    B,
}

impl Convention {
    pub fn direction(self, kind: EdgeKind) -> Direction {
        match (self, kind) {
            (Self::A, EdgeKind::Subtask) | (Self::B, EdgeKind::Workflow) => Direction::Down,
            (Self::A, EdgeKind::Workflow) | (Self::B, EdgeKind::Subtask) => Direction::Right,
        }
    }

    /// Subtasks are laid out first so they stay next to their parent
    fn first(self) -> Direction {
        self.direction(EdgeKind::Subtask)
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "subtasks↓ workflow→"),
            Self::B => write!(f, "subtasks→ workflow↓"),
        }
    }
}

/// Zoom factor, clamped to `[MIN, MAX]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zoom(f64);

impl Zoom {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 2.0;
    pub const STEP: f64 = 0.1;

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn zoom_in(self) -> Self {
        Self::new(((self.0 + Self::STEP) * 10.0).round() / 10.0)
    }

    pub fn zoom_out(self) -> Self {
        Self::new(((self.0 - Self::STEP) * 10.0).round() / 10.0)
    }

    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Base dimensions at zoom 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub card_width: f64,
    pub card_height: f64,
    /// Gap between a card and the column to its right
    pub spacing_h: f64,
    /// Gap between vertically stacked cards
    pub spacing_v: f64,
    /// Horizontal offset of the column below a card
    pub indent: f64,
    /// Gap between stacked root trees
    pub root_gap: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            card_width: 240.0,
            card_height: 120.0,
            spacing_h: 60.0,
            spacing_v: 50.0,
            indent: 30.0,
            root_gap: 40.0,
        }
    }
}

impl LayoutMetrics {
    /// Name of the first dimension the layout cannot work with.
    ///
    /// Card sizes must be positive; gaps and the indent must not be negative.
    pub fn invalid_field(&self) -> Option<&'static str> {
        let positive = [
            ("card_width", self.card_width),
            ("card_height", self.card_height),
        ];
        let non_negative = [
            ("spacing_h", self.spacing_h),
            ("spacing_v", self.spacing_v),
            ("indent", self.indent),
            ("root_gap", self.root_gap),
        ];
        positive
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
            .or_else(|| {
                non_negative
                    .iter()
                    .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
            })
            .map(|(name, _)| *name)
    }

    pub fn scaled(&self, zoom: Zoom) -> Self {
        let z = zoom.value();
        Self {
            card_width: self.card_width * z,
            card_height: self.card_height * z,
            spacing_h: self.spacing_h * z,
            spacing_v: self.spacing_v * z,
            indent: self.indent * z,
            root_gap: self.root_gap * z,
        }
    }
}

/// Relation a connector represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Subtask,
    Workflow,
}

/// End decoration of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// Arrow head, used on rightward connectors
    Arrow,
    /// Rounded joint, used on downward connectors
    Joint,
}

/// Line between a parent card and one direct child.
///
/// `path` is an orthogonal polyline from the midpoint of the parent's
/// adjoining edge to the midpoint of the child's left edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub kind: EdgeKind,
    pub from: TaskId,
    pub to: TaskId,
    pub marker: Marker,
    pub path: Vec<Point>,
}

impl Connector {
    pub fn start(&self) -> Option<Point> {
        self.path.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.path.last().copied()
    }

    /// Consecutive point pairs
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.path.windows(2).map(|w| (w[0], w[1]))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub id: TaskId,
    pub rect: Rect,
    /// Nesting level from the tree root, counting both relations
    pub depth: usize,
}

/// Result of one layout pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub placements: Vec<Placement>,
    pub connectors: Vec<Connector>,
    /// Total space consumed from the pass origin
    pub extent: Extent,
    #[serde(skip)]
    index: HashMap<TaskId, usize>,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn rect(&self, id: &TaskId) -> Option<Rect> {
        self.index.get(id).map(|&i| self.placements[i].rect)
    }

    /// Card under a point, if any
    pub fn hit_test(&self, point: Point) -> Option<&TaskId> {
        self.placements
            .iter()
            .rev()
            .find(|p| p.rect.contains(point))
            .map(|p| &p.id)
    }

    /// Bounding box of every placed card
    pub fn bounds(&self) -> Option<Rect> {
        self.placements
            .iter()
            .map(|p| p.rect)
            .reduce(|acc, r| acc.union(&r))
    }

    fn push(&mut self, id: TaskId, rect: Rect, depth: usize) {
        self.index.insert(id.clone(), self.placements.len());
        self.placements.push(Placement { id, rect, depth });
    }
}

/// One layout pass over a store. Each task is placed at most once per pass.
pub struct LayoutEngine<'a> {
    store: &'a TaskStore,
    convention: Convention,
    metrics: LayoutMetrics,
    visited: HashSet<TaskId>,
    layout: Layout,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(
        store: &'a TaskStore,
        convention: Convention,
        metrics: &LayoutMetrics,
        zoom: Zoom,
    ) -> Self {
        Self {
            store,
            convention,
            metrics: metrics.scaled(zoom),
            visited: HashSet::new(),
            layout: Layout::default(),
        }
    }

    /// Place `root` and everything reachable from it with its top-left
    /// corner at `origin`. Returns the extent consumed, or `None` when the
    /// root is unknown or was already placed in this pass.
    pub fn place_tree(&mut self, root: &TaskId, origin: Point) -> Option<Extent> {
        self.place(root, origin, 0)
    }

    pub fn finish(self) -> Layout {
        self.layout
    }

    fn place(&mut self, id: &TaskId, origin: Point, depth: usize) -> Option<Extent> {
        if !self.store.contains(id) {
            return None;
        }
        if !self.visited.insert(id.clone()) {
            log::warn!("Task {} already placed in this pass, skipping", id.short());
            return None;
        }

        let m = self.metrics;
        let card = Rect::new(origin.x, origin.y, m.card_width, m.card_height);
        self.layout.push(id.clone(), card, depth);

        let subtasks = self.store.subtasks(id);
        let siblings = self.store.workflow_siblings(id);
        let (right, right_kind, down, down_kind) = match self.convention {
            Convention::A => (siblings, EdgeKind::Workflow, subtasks, EdgeKind::Subtask),
            Convention::B => (subtasks, EdgeKind::Subtask, siblings, EdgeKind::Workflow),
        };

        let mut width = m.card_width;
        let mut height = m.card_height;
        match self.convention.first() {
            Direction::Right => {
                let column_x = card.right() + m.spacing_h;
                if let Some(used) = self.place_right(id, card, &right, right_kind, column_x, depth)
                {
                    width = width.max(column_x - origin.x + used.width);
                    height = height.max(used.height);
                }

                let top = origin.y + height + m.spacing_v;
                if let Some(used) = self.place_below(id, card, &down, down_kind, top, depth) {
                    width = width.max(m.indent + used.width);
                    height = top - origin.y + used.height;
                }
            }
            Direction::Down => {
                let top = card.bottom() + m.spacing_v;
                if let Some(used) = self.place_below(id, card, &down, down_kind, top, depth) {
                    width = width.max(m.indent + used.width);
                    height = top - origin.y + used.height;
                }

                let column_x = origin.x + width + m.spacing_h;
                if let Some(used) = self.place_right(id, card, &right, right_kind, column_x, depth)
                {
                    width = column_x - origin.x + used.width;
                    height = height.max(used.height);
                }
            }
        }

        Some(Extent { width, height })
    }

    /// Column of children to the right, top-aligned with the parent card
    fn place_right(
        &mut self,
        parent_id: &TaskId,
        parent: Rect,
        children: &[TaskId],
        kind: EdgeKind,
        column_x: f64,
        depth: usize,
    ) -> Option<Extent> {
        let m = self.metrics;
        let rail_x = column_x - m.spacing_h / 2.0;
        let start = parent.mid_right();
        let mut y = parent.y;
        let mut width: f64 = 0.0;
        let mut placed = false;

        for child in children {
            let Some(used) = self.place(child, Point::new(column_x, y), depth + 1) else {
                continue;
            };
            let end = Rect::new(column_x, y, m.card_width, m.card_height).mid_left();
            self.connect(
                parent_id,
                child,
                kind,
                Marker::Arrow,
                vec![
                    start,
                    Point::new(rail_x, start.y),
                    Point::new(rail_x, end.y),
                    end,
                ],
            );
            width = width.max(used.width);
            y += used.height + m.spacing_v;
            placed = true;
        }

        placed.then(|| Extent {
            width,
            height: y - m.spacing_v - parent.y,
        })
    }

    /// Column of children below the parent, indented, starting at `top`
    fn place_below(
        &mut self,
        parent_id: &TaskId,
        parent: Rect,
        children: &[TaskId],
        kind: EdgeKind,
        top: f64,
        depth: usize,
    ) -> Option<Extent> {
        let m = self.metrics;
        let column_x = parent.x + m.indent;
        let rail_x = parent.x + m.indent / 2.0;
        let start = parent.mid_bottom();
        let jog_y = parent.bottom() + m.spacing_v / 2.0;
        let mut y = top;
        let mut width: f64 = 0.0;
        let mut placed = false;

        for child in children {
            let Some(used) = self.place(child, Point::new(column_x, y), depth + 1) else {
                continue;
            };
            let end = Rect::new(column_x, y, m.card_width, m.card_height).mid_left();
            self.connect(
                parent_id,
                child,
                kind,
                Marker::Joint,
                vec![
                    start,
                    Point::new(start.x, jog_y),
                    Point::new(rail_x, jog_y),
                    Point::new(rail_x, end.y),
                    end,
                ],
            );
            width = width.max(used.width);
            y += used.height + m.spacing_v;
            placed = true;
        }

        placed.then(|| Extent {
            width,
            height: y - m.spacing_v - top,
        })
    }

    fn connect(
        &mut self,
        from: &TaskId,
        to: &TaskId,
        kind: EdgeKind,
        marker: Marker,
        path: Vec<Point>,
    ) {
        self.layout.connectors.push(Connector {
            kind,
            from: from.clone(),
            to: to.clone(),
            marker,
            path: simplify(path),
        });
    }
}

/// Drop repeated points and interior points of straight runs
fn simplify(mut path: Vec<Point>) -> Vec<Point> {
    path.dedup();
    let mut out: Vec<Point> = Vec::with_capacity(path.len());
    for p in path {
        if let [.., a, b] = out.as_slice() {
            if (a.x == b.x && b.x == p.x) || (a.y == b.y && b.y == p.y) {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// Lay out several root trees stacked top to bottom from `origin`
pub fn layout_roots(
    store: &TaskStore,
    roots: &[TaskId],
    origin: Point,
    convention: Convention,
    metrics: &LayoutMetrics,
    zoom: Zoom,
) -> Layout {
    let gap = metrics.root_gap * zoom.value();
    let mut engine = LayoutEngine::new(store, convention, metrics, zoom);
    let mut y = origin.y;
    let mut width: f64 = 0.0;
    let mut placed = false;

    for root in roots {
        let Some(used) = engine.place_tree(root, Point::new(origin.x, y)) else {
            continue;
        };
        width = width.max(used.width);
        y += used.height + gap;
        placed = true;
    }

    let mut layout = engine.finish();
    if placed {
        layout.extent = Extent {
            width,
            height: y - gap - origin.y,
        };
    }
    log::debug!(
        "Layout pass: {} cards, {} connectors, {:.0}x{:.0}",
        layout.placements.len(),
        layout.connectors.len(),
        layout.extent.width,
        layout.extent.height
    );
    layout
}

/// Lay out a single tree
pub fn layout_tree(
    store: &TaskStore,
    root: &TaskId,
    origin: Point,
    convention: Convention,
    metrics: &LayoutMetrics,
    zoom: Zoom,
) -> Layout {
    layout_roots(
        store,
        std::slice::from_ref(root),
        origin,
        convention,
        metrics,
        zoom,
    )
}
