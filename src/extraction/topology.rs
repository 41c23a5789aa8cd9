//! Electrode group topology
//!
//! Probes are organized into groups ("shanks") of channels that are
//! treated as one spatial unit. The topology is static configuration:
//! a channel absent from it is dead and must never appear in a detected
//! component.

use std::collections::{BTreeMap, HashMap};

use crate::error::WaveformError;

/// Static mapping between channels and electrode groups
#[derive(Debug, Clone)]
pub struct ChannelTopology {
    /// Group id -> ordered member channels
    channels_per_group: BTreeMap<usize, Vec<usize>>,
    /// Channel -> group id
    channel_groups: HashMap<usize, usize>,
}

impl ChannelTopology {
    /// Build a topology from a group id -> member channels mapping
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidConfig` if a channel appears in
    /// more than one group or a group has no members.
    pub fn new(channels_per_group: BTreeMap<usize, Vec<usize>>) -> Result<Self, WaveformError> {
        let mut channel_groups = HashMap::new();
        for (&group, channels) in &channels_per_group {
            if channels.is_empty() {
                return Err(WaveformError::InvalidConfig(format!(
                    "Group {} has no member channels",
                    group
                )));
            }
            for &channel in channels {
                if channel_groups.insert(channel, group).is_some() {
                    return Err(WaveformError::InvalidConfig(format!(
                        "Channel {} belongs to more than one group",
                        channel
                    )));
                }
            }
        }
        Ok(Self {
            channels_per_group,
            channel_groups,
        })
    }

    /// Look up the group id and ordered member channels for a channel
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::DeadChannel` if the channel is not part
    /// of any group.
    pub fn group_of(&self, channel: usize) -> Result<(usize, &[usize]), WaveformError> {
        let group = *self
            .channel_groups
            .get(&channel)
            .ok_or(WaveformError::DeadChannel(channel))?;
        // The two maps are built together; the group is always present.
        let members = &self.channels_per_group[&group];
        Ok((group, members))
    }

    /// Member channels of a group, if it exists
    pub fn members(&self, group: usize) -> Option<&[usize]> {
        self.channels_per_group.get(&group).map(|v| v.as_slice())
    }

    /// Number of groups
    pub fn n_groups(&self) -> usize {
        self.channels_per_group.len()
    }
}
