/// Test fixtures: representative source files as written by the station's
/// sensor loggers.
///
/// They are truncated to the minimum needed to exercise the parsers but keep
/// the real shapes:
///
///   sensors          - one JSON document, `date` + `measure[]`
///   gpsNmea          - raw NMEA-0183 dump, RMC interleaved with GGA/GSV
///   rainCounter.log  - one bucket-tip date per line, mixed date styles
///
/// Note: the NMEA feed deliberately contains corrupt and void sentences;
/// the receiver emits those routinely after a cold start.

/// The reference single-entry document.
#[cfg(test)]
pub(crate) fn fixture_single_measure_json() -> &'static str {
    r#"{"date":"2024-01-01T00:00:00Z","measure":[{"name":"temp","unit":"C","desc":"air temp","value":21}]}"#
}

/// Full station document: float, integer and boolean readings.
#[cfg(test)]
pub(crate) fn fixture_weather_station_json() -> &'static str {
    r#"{
      "date": "2024-03-16T14:20:00+01:00",
      "measure": [
        { "name": "temperature", "unit": "C",   "desc": "Air temperature",   "value": 18.5 },
        { "name": "humidity",    "unit": "%",   "desc": "Relative humidity", "value": 64 },
        { "name": "pressure",    "unit": "hPa", "desc": "Barometric",        "value": 1013.25 },
        { "name": "door_open",   "unit": "",    "desc": "Enclosure door",    "value": false }
      ]
    }"#
}

/// Six entries, of which only #1 and #5 are complete.
#[cfg(test)]
pub(crate) fn fixture_partially_broken_json() -> &'static str {
    r#"{
      "date": "2024-01-01T00:00:00Z",
      "measure": [
        { "name": "temperature", "unit": "C", "desc": "Air temperature", "value": 4.5 },
        { "name": "humidity", "desc": "Relative humidity", "value": 81 },
        { "name": "pressure", "unit": "hPa", "desc": "Barometric" },
        { "name": "wind", "unit": "km/h", "desc": "Wind speed", "value": "n/a" },
        { "name": "luminosity", "unit": "lx", "desc": "Ambient light", "value": 1200 },
        42
      ]
    }"#
}

/// Eight sentences: three RMC fixes, plus GGA, GSV, a void RMC without
/// position, a line of serial noise and an RMC with a bad checksum.
#[cfg(test)]
pub(crate) fn fixture_mixed_nmea_feed() -> &'static str {
    "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n\
     $GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n\
     $GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74\r\n\
     $GPRMC,225446.50,V,,,,,,,191194,,*1C\r\n\
     \r\n\
     $GNRMC,083559.00,A,4717.11437,N,00833.91522,E,0.004,77.52,091202,,,A*49\r\n\
     ~~\u{0}#garbled\r\n\
     $GPRMC,101500,A,4330.000,N,00130.000,W,0.0,0.0,150624,,*99\r\n\
     $GPRMC,101500,A,4330.000,N,00130.000,W,0.0,0.0,150624,,*08\r\n"
}

/// Four tips within the first hour of 2024, in the date styles seen in the
/// field.
#[cfg(test)]
pub(crate) fn fixture_rain_log() -> &'static str {
    "2024-01-01T00:00:00Z\n\
     2024-01-01 00:00:15\n\
     Mon Jan  1 00:01:30 UTC 2024\n\
     2024-01-01T02:00:00+01:00\n"
}
