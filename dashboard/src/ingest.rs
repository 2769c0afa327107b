//! Telemetry ingest: live sensor reports and bulk history reloads.

use sensorhub_protocol::message::{HistoryPayload, SensorReport};
use sensorhub_protocol::MetricStatus;
use tracing::{trace, warn};

use crate::series::{ChartSink, SeriesBuffer};
use crate::view::PLACEHOLDER;

/// Chart window: matches the device's on-board history ring.
pub const CHART_POINTS: usize = 90;

/// One dashboard tile: a formatted reading plus its server-decided
/// status indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub reading: String,
    pub indicator: MetricStatus,
}

impl Default for MetricTile {
    fn default() -> Self {
        Self {
            reading: PLACEHOLDER.to_string(),
            indicator: MetricStatus::Unset,
        }
    }
}

/// Reading tiles for every tracked metric.
#[derive(Debug, Clone, Default)]
pub struct Readings {
    pub temperature: MetricTile,
    pub humidity: MetricTile,
    pub co: MetricTile,
    pub no2: MetricTile,
    pub c2h5oh: MetricTile,
    pub voc: MetricTile,
}

/// Tiles plus the two chart buffers, advanced only from here.
#[derive(Debug)]
pub struct Telemetry {
    pub readings: Readings,
    pub climate: SeriesBuffer,
    pub gas: SeriesBuffer,
}

impl Telemetry {
    pub fn new(chart_points: usize) -> Self {
        Self {
            readings: Readings::default(),
            climate: SeriesBuffer::new("climate", chart_points, &["temp", "hum"]),
            gas: SeriesBuffer::new("gas", chart_points, &["co", "no2", "c2h5oh", "voc"]),
        }
    }

    /// Applies one live report: tiles and indicators always update; the
    /// chart buffers advance only when the report carries a time label.
    pub fn apply_report(
        &mut self,
        report: &SensorReport,
        climate_sink: &mut dyn ChartSink,
        gas_sink: &mut dyn ChartSink,
    ) {
        let gas = report.gas_ppm.unwrap_or_default();

        self.readings.temperature.reading = fmt_reading(report.temperature, 1);
        self.readings.humidity.reading = fmt_reading(report.humidity, 1);
        self.readings.co.reading = fmt_reading(gas.co, 2);
        self.readings.no2.reading = fmt_reading(gas.no2, 2);
        self.readings.c2h5oh.reading = fmt_reading(gas.c2h5oh, 1);
        self.readings.voc.reading = fmt_reading(gas.voc, 2);

        self.readings.temperature.indicator = MetricStatus::from_tag(report.temp_status.as_deref());
        self.readings.humidity.indicator = MetricStatus::from_tag(report.hum_status.as_deref());
        self.readings.co.indicator = MetricStatus::from_tag(report.gas_co_status.as_deref());
        self.readings.no2.indicator = MetricStatus::from_tag(report.gas_no2_status.as_deref());
        self.readings.c2h5oh.indicator =
            MetricStatus::from_tag(report.gas_c2h5oh_status.as_deref());
        self.readings.voc.indicator = MetricStatus::from_tag(report.gas_voc_status.as_deref());

        // No time label means no usable x-axis position: the tiles still
        // update but the series must not advance.
        let Some(label) = report.time_str.as_deref() else {
            trace!("sensor report without time label, charts unchanged");
            return;
        };

        self.climate
            .push_row(label, &[report.temperature, report.humidity]);
        climate_sink.redraw(&self.climate);

        if report.gas_ppm.is_some() {
            self.gas
                .push_row(label, &[gas.co, gas.no2, gas.c2h5oh, gas.voc]);
            gas_sink.redraw(&self.gas);
        }
    }

    /// Replaces both chart buffers with the device's history, keeping the
    /// most recent window. One redraw per chart, not per record.
    pub fn load_history(
        &mut self,
        payload: &HistoryPayload,
        climate_sink: &mut dyn ChartSink,
        gas_sink: &mut dyn ChartSink,
    ) {
        if let Some(error) = &payload.error {
            warn!(%error, "device could not serialize history");
        }

        let mut climate_rows = Vec::with_capacity(payload.history.len());
        let mut gas_rows = Vec::with_capacity(payload.history.len());
        for record in &payload.history {
            climate_rows.push((record.time.clone(), vec![record.temp, record.hum]));
            gas_rows.push((
                record.time.clone(),
                vec![record.co, record.no2, record.c2h5oh, record.voc],
            ));
        }

        self.climate.replace_all(climate_rows);
        self.gas.replace_all(gas_rows);
        climate_sink.redraw(&self.climate);
        gas_sink.redraw(&self.gas);
        trace!(points = self.climate.len(), "charts reloaded from history");
    }
}

fn fmt_reading(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => PLACEHOLDER.to_string(),
    }
}
