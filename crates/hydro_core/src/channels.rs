//! Named scalar channels exposed by the models for external result recording.
//!
//! Bodies implement [`ChannelSource`]; a [`ResultsLog`] samples the channels it
//! was asked to track each time a group is logged. Groups are locked once the
//! first sample is taken so every channel in a group stays row-aligned.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{HydroError, HydroResult};

pub trait ChannelSource {
    /// Current (alias, value) pairs. Booleans are reported as 0.0 / 1.0.
    fn channels(&self) -> Vec<(&'static str, f64)>;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelGroup {
    order: Vec<String>,
    data: BTreeMap<String, Vec<f64>>,
}

impl ChannelGroup {
    pub fn channel(&self, alias: &str) -> Option<&[f64]> {
        self.data.get(alias).map(Vec::as_slice)
    }

    pub fn aliases(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order
            .first()
            .and_then(|alias| self.data.get(alias))
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsLog {
    name: String,
    groups: BTreeMap<String, ChannelGroup>,
    running: bool,
}

impl ResultsLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_group(&mut self, group: &str) -> HydroResult<()> {
        self.ensure_configurable()?;
        if self.groups.contains_key(group) {
            return Err(HydroError::Validation(format!(
                "Log {} already contains a group called {group}",
                self.name
            )));
        }
        self.groups.insert(group.to_string(), ChannelGroup::default());
        Ok(())
    }

    pub fn add_channel_to_group(&mut self, alias: &str, group: &str) -> HydroResult<()> {
        self.ensure_configurable()?;
        let entry = self.groups.get_mut(group).ok_or_else(|| missing_group(group))?;
        if entry.data.contains_key(alias) {
            return Err(HydroError::Validation(format!(
                "Group {group} already contains a channel called {alias}"
            )));
        }
        entry.order.push(alias.to_string());
        entry.data.insert(alias.to_string(), Vec::new());
        Ok(())
    }

    /// Registers a group tracking every channel `source` currently exposes.
    pub fn add_source(&mut self, group: &str, source: &dyn ChannelSource) -> HydroResult<()> {
        self.add_group(group)?;
        for (alias, _) in source.channels() {
            self.add_channel_to_group(alias, group)?;
        }
        Ok(())
    }

    /// Appends one sample of every tracked channel in `group` taken from `source`.
    pub fn log(&mut self, group: &str, source: &dyn ChannelSource) -> HydroResult<()> {
        let values: BTreeMap<&str, f64> = source.channels().into_iter().collect();
        let entry = self.groups.get_mut(group).ok_or_else(|| missing_group(group))?;
        let mut row = Vec::with_capacity(entry.order.len());
        for alias in &entry.order {
            let value = values.get(alias.as_str()).copied().ok_or_else(|| {
                HydroError::Validation(format!("Source logged to {group} has no channel {alias}"))
            })?;
            row.push(value);
        }
        for (alias, value) in entry.order.iter().zip(row) {
            if let Some(data) = entry.data.get_mut(alias) {
                data.push(value);
            }
        }
        self.running = true;
        Ok(())
    }

    /// Logs several groups as one aligned row.
    pub fn log_all(&mut self, sources: &[(&str, &dyn ChannelSource)]) -> HydroResult<()> {
        for (group, source) in sources {
            self.log(group, *source)?;
        }
        Ok(())
    }

    pub fn group(&self, group: &str) -> Option<&ChannelGroup> {
        self.groups.get(group)
    }

    pub fn channel(&self, group: &str, alias: &str) -> Option<&[f64]> {
        self.groups.get(group)?.channel(alias)
    }

    fn ensure_configurable(&self) -> HydroResult<()> {
        if self.running {
            return Err(HydroError::Validation(format!(
                "Log {} has started recording; channels can no longer be added",
                self.name
            )));
        }
        Ok(())
    }
}

fn missing_group(group: &str) -> HydroError {
    HydroError::Validation(format!("No log group called {group}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OperatingPoint {
        speed: f64,
        power: f64,
    }

    impl ChannelSource for OperatingPoint {
        fn channels(&self) -> Vec<(&'static str, f64)> {
            vec![("Speed_kts", self.speed), ("PowerRequired_kW", self.power)]
        }
    }

    #[test]
    fn records_aligned_rows() {
        let mut log = ResultsLog::new("Sweep");
        let mut point = OperatingPoint {
            speed: 10.0,
            power: 1.0,
        };
        log.add_source("OperatingProfile", &point).unwrap();
        for i in 0..3 {
            point.speed = 10.0 + i as f64;
            point.power = 100.0 * i as f64;
            log.log("OperatingProfile", &point).unwrap();
        }
        assert_eq!(
            log.channel("OperatingProfile", "Speed_kts").unwrap(),
            &[10.0, 11.0, 12.0]
        );
        assert_eq!(log.group("OperatingProfile").unwrap().len(), 3);
    }

    #[test]
    fn selected_channels_only() {
        let mut log = ResultsLog::new("Sweep");
        let point = OperatingPoint {
            speed: 4.0,
            power: 2.0,
        };
        log.add_group("Ops").unwrap();
        log.add_channel_to_group("PowerRequired_kW", "Ops").unwrap();
        let sources: [(&str, &dyn ChannelSource); 1] = [("Ops", &point)];
        log.log_all(&sources).unwrap();
        assert!(log.channel("Ops", "Speed_kts").is_none());
        assert_eq!(log.channel("Ops", "PowerRequired_kW").unwrap(), &[2.0]);
    }

    #[test]
    fn rejects_changes_after_recording_starts() {
        let mut log = ResultsLog::new("Sweep");
        let point = OperatingPoint {
            speed: 1.0,
            power: 1.0,
        };
        log.add_source("Ops", &point).unwrap();
        log.log("Ops", &point).unwrap();
        let err = log.add_group("Late").unwrap_err();
        assert!(err.to_string().contains("no longer be added"));
        assert!(log.add_source("Ops", &point).is_err());
    }

    #[test]
    fn unknown_channel_is_reported() {
        let mut log = ResultsLog::new("Sweep");
        log.add_group("Ops").unwrap();
        log.add_channel_to_group("Thrust_N", "Ops").unwrap();
        let point = OperatingPoint {
            speed: 1.0,
            power: 1.0,
        };
        let err = log.log("Ops", &point).unwrap_err();
        assert!(err.to_string().contains("Thrust_N"));
    }
}
