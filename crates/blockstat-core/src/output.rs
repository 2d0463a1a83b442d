//! Output sinks for emitted records.
//!
//! `PutvalWriter` speaks the plain-text protocol of collectd's exec plugin,
//! so the daemon can run as an exec child. `JsonLinesWriter` writes one JSON
//! object per record for other pipelines.

use std::io::{self, Write};
use std::time::Duration;

use crate::record::ValueRecord;

/// Receives records as they are produced.
pub trait OutputSink {
    fn dispatch(&mut self, record: &ValueRecord) -> io::Result<()>;

    /// Called once at the end of a cycle.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputSink for Vec<ValueRecord> {
    fn dispatch(&mut self, record: &ValueRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes `PUTVAL "<identifier>" interval=<secs> <epoch>:<value>` lines.
pub struct PutvalWriter<W: Write> {
    out: W,
    host: String,
    interval: Duration,
}

impl<W: Write> PutvalWriter<W> {
    pub fn new(out: W, host: impl Into<String>, interval: Duration) -> Self {
        Self {
            out,
            host: host.into(),
            interval,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputSink for PutvalWriter<W> {
    fn dispatch(&mut self, record: &ValueRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "PUTVAL \"{}\" interval={} {}:{}",
            record.identifier(&self.host),
            self.interval.as_secs_f64(),
            record.time.timestamp(),
            record.value
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(feature = "json")]
pub use json::JsonLinesWriter;

#[cfg(feature = "json")]
mod json {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct HostRecord<'a> {
        host: &'a str,
        #[serde(flatten)]
        record: &'a ValueRecord,
    }

    /// Writes one JSON object per record, newline-delimited.
    pub struct JsonLinesWriter<W: Write> {
        out: W,
        host: String,
    }

    impl<W: Write> JsonLinesWriter<W> {
        pub fn new(out: W, host: impl Into<String>) -> Self {
            Self {
                out,
                host: host.into(),
            }
        }

        pub fn into_inner(self) -> W {
            self.out
        }
    }

    impl<W: Write> OutputSink for JsonLinesWriter<W> {
        fn dispatch(&mut self, record: &ValueRecord) -> io::Result<()> {
            let line = HostRecord {
                host: &self.host,
                record,
            };
            serde_json::to_writer(&mut self.out, &line)?;
            self.out.write_all(b"\n")
        }

        fn flush(&mut self) -> io::Result<()> {
            self.out.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use chrono::{TimeZone, Utc};

    fn record(field: Field, value: u64) -> ValueRecord {
        let time = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        ValueRecord::new("sda", field, value, time)
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<ValueRecord> = Vec::new();
        sink.dispatch(&record(Field::ReadIos, 1)).unwrap();
        sink.dispatch(&record(Field::WriteIos, 2)).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].type_instance, "write_ios");
    }

    #[test]
    fn test_putval_format() {
        let mut writer = PutvalWriter::new(Vec::new(), "db1", Duration::from_secs(10));
        writer.dispatch(&record(Field::ReadIos, 50)).unwrap();
        writer.dispatch(&record(Field::IoTicks, 7)).unwrap();
        writer.flush().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "PUTVAL \"db1/blockstat-sda/gauge-read_ios\" interval=10 1700000000:50\n\
             PUTVAL \"db1/blockstat-sda/gauge-io_ticks\" interval=10 1700000000:7\n"
        );
    }

    #[test]
    fn test_putval_fractional_interval() {
        let mut writer = PutvalWriter::new(Vec::new(), "h", Duration::from_millis(2500));
        writer.dispatch(&record(Field::ReadIos, 1)).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains(" interval=2.5 "));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_lines_format() {
        let mut writer = JsonLinesWriter::new(Vec::new(), "db1");
        writer.dispatch(&record(Field::ReadSectors, 400)).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["host"], "db1");
        assert_eq!(value["plugin"], "blockstat");
        assert_eq!(value["plugin_instance"], "sda");
        assert_eq!(value["type"], "gauge");
        assert_eq!(value["type_instance"], "read_sectors");
        assert_eq!(value["value"], 400);
        assert_eq!(value["time"], "2023-11-14T22:13:20Z");
    }
}
