//! Bounded, label-aligned time series storage feeding the charts.

use std::collections::VecDeque;

use tracing::trace;

/// Receives redraw notifications whenever a buffer's contents change.
/// Chart rendering itself lives outside this crate; anything that can
/// consume ordered rows can sit behind this trait.
pub trait ChartSink: Send {
    fn redraw(&mut self, buffer: &SeriesBuffer);
}

/// A sink that only traces. Used by the binary and as the default.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ChartSink for TracingSink {
    fn redraw(&mut self, buffer: &SeriesBuffer) {
        trace!(chart = buffer.name(), points = buffer.len(), "chart redraw");
    }
}

/// Fixed-capacity set of parallel metric series sharing one label track.
///
/// Appending evicts the oldest row once the capacity is reached, so the
/// buffer always holds the most recent `capacity` rows in arrival order.
/// Every series advances in lock-step with the label track; a metric with
/// no value in a given row holds `None` there, which keeps indices aligned
/// across series through any number of evictions.
#[derive(Debug)]
pub struct SeriesBuffer {
    name: &'static str,
    capacity: usize,
    series_names: Vec<&'static str>,
    labels: VecDeque<String>,
    series: Vec<VecDeque<Option<f64>>>,
}

impl SeriesBuffer {
    pub fn new(name: &'static str, capacity: usize, series_names: &[&'static str]) -> Self {
        assert!(capacity > 0, "series buffer needs a nonzero capacity");
        Self {
            name,
            capacity,
            series_names: series_names.to_vec(),
            labels: VecDeque::with_capacity(capacity),
            series: series_names
                .iter()
                .map(|_| VecDeque::with_capacity(capacity))
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Appends one row: a shared label plus one value per series, in the
    /// order the series were declared. Evicts the oldest row first when
    /// the buffer is full.
    pub fn push_row(&mut self, label: impl Into<String>, values: &[Option<f64>]) {
        debug_assert_eq!(values.len(), self.series.len(), "row width mismatch");
        if self.labels.len() == self.capacity {
            self.labels.pop_front();
            for s in &mut self.series {
                s.pop_front();
            }
        }
        self.labels.push_back(label.into());
        for (s, v) in self.series.iter_mut().zip(values) {
            s.push_back(*v);
        }
    }

    /// Replaces the whole contents with the most recent `capacity` rows of
    /// `rows`, in original order.
    pub fn replace_all(&mut self, rows: Vec<(String, Vec<Option<f64>>)>) {
        self.labels.clear();
        for s in &mut self.series {
            s.clear();
        }
        let skip = rows.len().saturating_sub(self.capacity);
        for (label, values) in rows.into_iter().skip(skip) {
            self.push_row(label, &values);
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Values of one named series, oldest first.
    pub fn series(&self, name: &str) -> Option<impl Iterator<Item = Option<f64>> + '_> {
        let idx = self.series_names.iter().position(|n| *n == name)?;
        Some(self.series[idx].iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, v: f64) -> (String, Vec<Option<f64>>) {
        (label.to_string(), vec![Some(v), Some(v * 2.0)])
    }

    #[test]
    fn holds_min_of_appends_and_capacity() {
        let mut buf = SeriesBuffer::new("t", 5, &["a", "b"]);
        for i in 0..3 {
            buf.push_row(format!("l{i}"), &[Some(i as f64), None]);
        }
        assert_eq!(buf.len(), 3);
        for i in 3..20 {
            buf.push_row(format!("l{i}"), &[Some(i as f64), None]);
        }
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn fifo_eviction_keeps_the_last_c_rows_in_order() {
        let mut buf = SeriesBuffer::new("t", 4, &["a"]);
        for i in 0..10 {
            buf.push_row(format!("l{i}"), &[Some(i as f64)]);
        }
        let labels: Vec<&str> = buf.labels().collect();
        assert_eq!(labels, ["l6", "l7", "l8", "l9"]);
        let vals: Vec<Option<f64>> = buf.series("a").unwrap().collect();
        assert_eq!(vals, [Some(6.0), Some(7.0), Some(8.0), Some(9.0)]);
    }

    #[test]
    fn missing_values_keep_series_aligned() {
        let mut buf = SeriesBuffer::new("t", 3, &["a", "b"]);
        buf.push_row("l0", &[Some(1.0), Some(2.0)]);
        buf.push_row("l1", &[None, Some(3.0)]);
        buf.push_row("l2", &[Some(4.0), None]);
        buf.push_row("l3", &[Some(5.0), Some(6.0)]);

        let a: Vec<Option<f64>> = buf.series("a").unwrap().collect();
        let b: Vec<Option<f64>> = buf.series("b").unwrap().collect();
        assert_eq!(a, [None, Some(4.0), Some(5.0)]);
        assert_eq!(b, [Some(3.0), None, Some(6.0)]);
        assert_eq!(buf.labels().count(), 3);
    }

    #[test]
    fn replace_all_truncates_to_most_recent() {
        let mut buf = SeriesBuffer::new("t", 3, &["a", "b"]);
        buf.push_row("old", &[Some(0.0), Some(0.0)]);

        let rows: Vec<_> = (0..7).map(|i| row(&format!("h{i}"), i as f64)).collect();
        buf.replace_all(rows);

        assert_eq!(buf.len(), 3);
        let labels: Vec<&str> = buf.labels().collect();
        assert_eq!(labels, ["h4", "h5", "h6"]);
    }

    #[test]
    fn replace_all_with_short_history_keeps_everything() {
        let mut buf = SeriesBuffer::new("t", 90, &["a", "b"]);
        buf.replace_all(vec![row("h0", 1.0), row("h1", 2.0)]);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.series("b").unwrap().next(), Some(Some(2.0)));
    }

    #[test]
    fn unknown_series_name_is_none() {
        let buf = SeriesBuffer::new("t", 3, &["a"]);
        assert!(buf.series("nope").is_none());
    }
}
