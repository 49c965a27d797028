/// station_ingest: weather station sensor ingestion service.
///
/// # Module structure
///
/// ```text
/// station_ingest
/// ├── model       - shared data types (CanonicalPoint, FieldValue, SourceDescriptor)
/// ├── error       - error enums (IngestError, StoreError, PointError, ConfigError)
/// ├── config      - service configuration loader (ingest.toml + env overrides)
/// ├── ingest
/// │   ├── json_measurements - sensor JSON document parser
/// │   ├── nmea    - NMEA-0183 RMC parser for the GPS dump
/// │   ├── rain_log - tipping-bucket rain gauge log parser
/// │   ├── datetime - date/time text → epoch milliseconds
/// │   └── fixtures (test only) - representative logger output
/// ├── store
/// │   ├── influx  - InfluxDB 1.x HTTP client
/// │   ├── line_protocol - point → line protocol rendering
/// │   ├── pg      - PostgreSQL sink
/// │   └── stdout  - dry-run sink
/// ├── run         - one source: read → parse → write
/// └── daemon      - periodic scheduler fanning runs out per source
/// ```

/// Public modules
pub mod config;
pub mod daemon;
pub mod error;
pub mod ingest;
pub mod model;
pub mod run;
pub mod store;
