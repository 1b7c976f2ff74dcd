// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Text-to-metrics parsing for the tracking executable's stdout.
//!
//! Lines are routed to a [`Category`] by a plain substring test on the
//! category label, and every `key=value` token of a metric the category
//! knows about is appended to that metric's series. A line that mentions
//! several labels feeds all of them.

use regex::Regex;
use rkyv::Archive;
use rkyv::Deserialize as RkyvDeserialize;
use rkyv::Serialize as RkyvSerialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

/// Pipeline stage a line of output reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum Category {
  Detector,
  Descriptor,
  Matcher,
}

impl Category {
  pub const ALL: [Category; 3] = [Category::Detector, Category::Descriptor, Category::Matcher];

  pub fn label(self) -> &'static str {
    match self {
      Category::Detector => "detector",
      Category::Descriptor => "descriptor",
      Category::Matcher => "matcher",
    }
  }

  /// Metrics recorded for this category, in output order.
  pub fn metrics(self) -> &'static [Metric] {
    match self {
      Category::Detector => &[Metric::N, Metric::T, Metric::M1, Metric::Rms],
      Category::Descriptor | Category::Matcher => &[Metric::N, Metric::T],
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum Metric {
  /// Keypoint or match count.
  N,
  /// Elapsed time in milliseconds.
  T,
  M1,
  Rms,
}

impl Metric {
  pub const ALL: [Metric; 4] = [Metric::N, Metric::T, Metric::M1, Metric::Rms];

  pub fn label(self) -> &'static str {
    match self {
      Metric::N => "n",
      Metric::T => "t",
      Metric::M1 => "m1",
      Metric::Rms => "rms",
    }
  }

  fn pattern(self) -> String {
    match self {
      Metric::N => r"n=(\d+)".to_string(),
      other => format!(r"{}=([\d.]+)", regex::escape(other.label())),
    }
  }

  fn empty_series(self) -> MetricSeries {
    match self {
      Metric::N => MetricSeries::Count(Vec::new()),
      _ => MetricSeries::Value(Vec::new()),
    }
  }
}

/// Successive samples of one metric, in order of appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
#[serde(untagged)]
pub enum MetricSeries {
  Count(Vec<u64>),
  Value(Vec<f64>),
}

impl MetricSeries {
  pub fn len(&self) -> usize {
    match self {
      MetricSeries::Count(values) => values.len(),
      MetricSeries::Value(values) => values.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn as_counts(&self) -> Option<&[u64]> {
    match self {
      MetricSeries::Count(values) => Some(values),
      MetricSeries::Value(_) => None,
    }
  }

  pub fn as_values(&self) -> Option<&[f64]> {
    match self {
      MetricSeries::Value(values) => Some(values),
      MetricSeries::Count(_) => None,
    }
  }

  /// Converts `token` and appends it. Returns `false` when the token is not
  /// a valid number for this series; nothing is appended in that case.
  fn push_token(&mut self, token: &str) -> bool {
    match self {
      MetricSeries::Count(values) => token.parse().map(|v| values.push(v)).is_ok(),
      MetricSeries::Value(values) => token.parse().map(|v| values.push(v)).is_ok(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct MetricEntry {
  pub metric: Metric,
  pub series: MetricSeries,
}

/// All series reported for one category.
#[derive(Debug, Clone, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct CategoryMetrics {
  pub category: Category,
  pub metrics: Vec<MetricEntry>,
}

impl CategoryMetrics {
  fn empty(category: Category) -> Self {
    Self {
      category,
      metrics: category
        .metrics()
        .iter()
        .map(|&metric| MetricEntry {
          metric,
          series: metric.empty_series(),
        })
        .collect(),
    }
  }

  pub fn series(&self, metric: Metric) -> Option<&MetricSeries> {
    self
      .metrics
      .iter()
      .find(|entry| entry.metric == metric)
      .map(|entry| &entry.series)
  }

  fn series_mut(&mut self, metric: Metric) -> Option<&mut MetricSeries> {
    self
      .metrics
      .iter_mut()
      .find(|entry| entry.metric == metric)
      .map(|entry| &mut entry.series)
  }

  /// True when no line of output reported on this category.
  pub fn is_empty(&self) -> bool {
    self.metrics.iter().all(|entry| entry.series.is_empty())
  }
}

impl Serialize for CategoryMetrics {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.metrics.len()))?;
    for entry in &self.metrics {
      map.serialize_entry(entry.metric.label(), &entry.series)?;
    }
    map.end()
  }
}

/// Metrics parsed from one successful run, keyed by category then metric.
#[derive(Debug, Clone, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct ParsedResult {
  pub categories: Vec<CategoryMetrics>,
}

impl ParsedResult {
  /// A result with every category and metric present and empty.
  pub fn empty() -> Self {
    Self {
      categories: Category::ALL.into_iter().map(CategoryMetrics::empty).collect(),
    }
  }

  pub fn category(&self, category: Category) -> Option<&CategoryMetrics> {
    self.categories.iter().find(|c| c.category == category)
  }

  pub fn series(&self, category: Category, metric: Metric) -> Option<&MetricSeries> {
    self.category(category)?.series(metric)
  }
}

impl Serialize for ParsedResult {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.categories.len()))?;
    for category in &self.categories {
      map.serialize_entry(category.category.label(), category)?;
    }
    map.end()
  }
}

/// Compiled metric patterns. Build once and share across workers.
#[derive(Debug)]
pub struct MetricParser {
  patterns: Vec<(Metric, Regex)>,
}

impl MetricParser {
  pub fn new() -> Result<Self, regex::Error> {
    let patterns = Metric::ALL
      .into_iter()
      .map(|metric| Regex::new(&metric.pattern()).map(|re| (metric, re)))
      .collect::<Result<_, _>>()?;
    Ok(Self { patterns })
  }

  /// Parses the decoded stdout of one run.
  ///
  /// Only the first `<metric>=` token of a line counts; a first token that
  /// does not convert to a number is dropped rather than falling through
  /// to a later one.
  pub fn parse(&self, text: &str) -> ParsedResult {
    let mut result = ParsedResult::empty();

    for line in text.lines() {
      for category in &mut result.categories {
        if !line.contains(category.category.label()) {
          continue;
        }
        for (metric, pattern) in &self.patterns {
          let Some(series) = category.series_mut(*metric) else {
            continue;
          };
          if let Some(caps) = pattern.captures(line) {
            if !series.push_token(&caps[1]) {
              tracing::debug!(metric = metric.label(), token = &caps[1], "Dropping non-numeric token");
            }
          }
        }
      }
    }

    result
  }
}
