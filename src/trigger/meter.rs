//! Metric lookup used by trigger expressions

use parking_lot::RwLock;
use std::collections::BTreeMap;

/// One statistic of a meter, e.g. `value`, `count` or `max`
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub statistic: String,
    pub value: f64,
}

impl Measurement {
    pub fn new(statistic: impl Into<String>, value: f64) -> Self {
        Self {
            statistic: statistic.into(),
            value,
        }
    }
}

/// Tag constraint of a [`MeterQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// Tag present with exactly this value
    Equals { key: String, value: String },
    /// Tag present with any value
    Present(String),
}

impl TagFilter {
    fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Equals { key, value } => tags.get(key) == Some(value),
            Self::Present(key) => tags.contains_key(key),
        }
    }
}

/// Named meter lookup narrowed by tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterQuery {
    name: String,
    tags: Vec<TagFilter>,
}

impl MeterQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Require tag `key` with `value`
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(TagFilter::Equals {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Require tag `key` with any value
    #[must_use]
    pub fn tag_key(mut self, key: impl Into<String>) -> Self {
        self.tags.push(TagFilter::Present(key.into()));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn tags(&self) -> &[TagFilter] {
        &self.tags
    }

    /// Whether a meter called `name` with `tags` satisfies this query
    #[must_use]
    pub fn matches(&self, name: &str, tags: &BTreeMap<String, String>) -> bool {
        self.name == name && self.tags.iter().all(|filter| filter.matches(tags))
    }

    /// Value of `statistic` on the matching meter, `0.0` when the meter or
    /// the statistic does not exist
    pub fn measurement(&self, source: &dyn MetricSource, statistic: &str) -> f64 {
        let Some(measurements) = source.find(self) else {
            log::debug!("No meter found for {}", self.name);
            return 0.0;
        };

        match measurements.iter().find(|m| m.statistic == statistic) {
            Some(m) => m.value,
            None => {
                log::debug!("No measurement with name {} found on {}", statistic, self.name);
                0.0
            }
        }
    }
}

/// Live metric lookup; absence is `None`, never an error
pub trait MetricSource: Send + Sync {
    fn find(&self, query: &MeterQuery) -> Option<Vec<Measurement>>;
}

#[derive(Debug, Clone)]
struct Meter {
    name: String,
    tags: BTreeMap<String, String>,
    measurements: Vec<Measurement>,
}

/// In-memory meter registry
///
/// Host applications push their current values in; the trigger checker
/// reads them on every tick.
#[derive(Debug, Default)]
pub struct StaticMetricSource {
    meters: RwLock<Vec<Meter>>,
}

impl StaticMetricSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a meter, replacing one with the same name and tags
    pub fn register(&self, name: &str, tags: &[(&str, &str)], measurements: Vec<Measurement>) {
        let tags = to_tag_map(tags);
        let mut meters = self.meters.write();
        match meters.iter_mut().find(|m| m.name == name && m.tags == tags) {
            Some(meter) => meter.measurements = measurements,
            None => meters.push(Meter {
                name: name.to_string(),
                tags,
                measurements,
            }),
        }
    }

    /// Set one statistic of a meter, registering the meter if needed
    pub fn set(&self, name: &str, tags: &[(&str, &str)], statistic: &str, value: f64) {
        let tags = to_tag_map(tags);
        let mut meters = self.meters.write();
        let meter = match meters.iter().position(|m| m.name == name && m.tags == tags) {
            Some(index) => &mut meters[index],
            None => {
                meters.push(Meter {
                    name: name.to_string(),
                    tags,
                    measurements: Vec::new(),
                });
                let last = meters.len() - 1;
                &mut meters[last]
            }
        };

        match meter.measurements.iter_mut().find(|m| m.statistic == statistic) {
            Some(m) => m.value = value,
            None => meter.measurements.push(Measurement::new(statistic, value)),
        }
    }
}

impl MetricSource for StaticMetricSource {
    fn find(&self, query: &MeterQuery) -> Option<Vec<Measurement>> {
        self.meters
            .read()
            .iter()
            .find(|meter| query.matches(&meter.name, &meter.tags))
            .map(|meter| meter.measurements.clone())
    }
}

fn to_tag_map(tags: &[(&str, &str)]) -> BTreeMap<String, String> {
    tags.iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
