use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of one image plane inside a multi-dimensional stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub time: usize,
    pub z: usize,
    pub channel: usize,
    pub position: usize,
}

impl Coords {
    /// Origin of the stack
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time(mut self, time: usize) -> Self {
        self.time = time;
        self
    }

    pub fn with_z(mut self, z: usize) -> Self {
        self.z = z;
        self
    }

    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} z={} c={} p={}",
            self.time, self.z, self.channel, self.position
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_axes() {
        let coords = Coords::new().with_time(3).with_z(2).with_channel(1).with_position(4);
        assert_eq!(coords.time, 3);
        assert_eq!(coords.z, 2);
        assert_eq!(coords.channel, 1);
        assert_eq!(coords.position, 4);
    }

    #[test]
    fn test_display_format() {
        let coords = Coords::new().with_time(7);
        assert_eq!(coords.to_string(), "t=7 z=0 c=0 p=0");
    }

    #[test]
    fn test_ordering_is_time_major() {
        let early = Coords::new().with_time(1).with_z(9);
        let late = Coords::new().with_time(2);
        assert!(early < late);
    }
}
