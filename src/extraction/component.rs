//! Connected components of threshold crossings

/// One detected event: an unordered set of (sample, channel) points that
/// crossed the detection threshold contiguously in time and channel space
///
/// All channels of a component belong to a single electrode group; the
/// detector guarantees this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// (sample_index, channel_index) pairs
    pub points: Vec<(usize, usize)>,
}

impl Component {
    /// Build a component from (sample, channel) pairs
    pub fn new(points: Vec<(usize, usize)>) -> Self {
        Self { points }
    }

    /// Number of threshold-crossing points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the component has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<(usize, usize)>> for Component {
    fn from(points: Vec<(usize, usize)>) -> Self {
        Self::new(points)
    }
}

/// A component resolved against the channel topology and trace length
///
/// Carries everything downstream stages need: the component's own points
/// split into parallel sample/channel vectors, the clipped time window,
/// the member channels of the owning group, and the group id.
#[derive(Debug, Clone)]
pub struct ComponentWindow {
    /// Sample index of each component point
    pub samples: Vec<usize>,
    /// Channel index of each component point
    pub channels_hit: Vec<usize>,
    /// First sample of the window (inclusive)
    pub s_min: usize,
    /// One past the last sample of the window
    pub s_max: usize,
    /// Ordered member channels of the owning group
    pub members: Vec<usize>,
    /// Owning group id
    pub group: usize,
}

impl ComponentWindow {
    /// Window length in samples
    pub fn len(&self) -> usize {
        self.s_max - self.s_min
    }

    /// Whether the window is empty (never true for a valid window)
    pub fn is_empty(&self) -> bool {
        self.s_max <= self.s_min
    }
}
