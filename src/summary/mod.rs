use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::render::escape_html;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Total,
    LowStock,
    OutOfStock,
    InStock,
    Active,
    Overdue,
    Returned,
    Areas,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
            Self::InStock => "In Stock",
            Self::Active => "Active",
            Self::Overdue => "Overdue",
            Self::Returned => "Returned",
            Self::Areas => "Areas",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    counts: BTreeMap<Metric, usize>,
}

impl Summary {
    pub fn get(&self, metric: Metric) -> usize {
        self.counts.get(&metric).copied().unwrap_or(0)
    }

    pub fn set(&mut self, metric: Metric, value: usize) {
        self.counts.insert(metric, value);
    }

    pub fn tally<K: PartialEq>(
        total: usize,
        metrics: &[(Metric, K)],
        keys: impl IntoIterator<Item = K>,
    ) -> Self {
        let mut summary = Self::default();
        summary.set(Metric::Total, total);
        for (metric, _) in metrics {
            summary.set(*metric, 0);
        }
        for key in keys {
            if let Some((metric, _)) = metrics.iter().find(|(_, k)| *k == key) {
                *summary.counts.entry(*metric).or_insert(0) += 1;
            }
        }
        summary
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, usize)> + '_ {
        self.counts.iter().map(|(m, v)| (*m, *v))
    }
}

#[derive(Clone, Debug, Default)]
pub struct SlotMap {
    slots: Vec<(Metric, String)>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: Metric, target: impl Into<String>) -> Self {
        self.slots.retain(|(m, _)| *m != metric);
        self.slots.push((metric, target.into()));
        self
    }

    pub fn target(&self, metric: Metric) -> Option<&str> {
        self.slots
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, t)| t.as_str())
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.slots.iter().map(|(m, _)| *m)
    }

    pub fn assignments(&self, summary: &Summary) -> Vec<(String, usize)> {
        self.slots
            .iter()
            .map(|(metric, target)| (target.clone(), summary.get(*metric)))
            .collect()
    }

    pub fn to_html(&self, summary: &Summary) -> String {
        let mut out = String::from("<div class=\"summary\">\n");
        for (metric, target) in &self.slots {
            out.push_str(&format!(
                "  <div class=\"summary-item\">\n    <span class=\"summary-label\">{}</span>\n    <span class=\"summary-value\" id=\"{}\">{}</span>\n  </div>\n",
                metric.label(),
                escape_html(target),
                summary.get(*metric)
            ));
        }
        out.push_str("</div>\n");
        out
    }
}
