// grid sizing: how many steps a pattern has, and how long one step lasts.
// everything in here is pure, the session owns the live GridConfig

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::ParseError;
use crate::shared::{DEFAULT_BPM, MAX_BEATS, MAX_BPM, MAX_MEASURES, MIN_BPM, STEPS_PER_BEAT};

// the ones the `t` key cycles through
pub const TIME_SIGNATURE_PRESETS: [&str; 6] = ["4/4", "3/4", "6/8", "5/4", "7/8", "2/4"];

/// "N/M" time signature. Only `beats` drives the grid size; every beat is split
/// into sixteenth notes no matter what `unit` says.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats: u32,
    pub unit: u32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature { beats: 4, unit: 4 };

    // the preset after this one, or the first preset if we're not on one
    pub fn next_preset(self) -> Self {
        let presets: Vec<TimeSignature> = TIME_SIGNATURE_PRESETS
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        match presets.iter().position(|p| *p == self) {
            Some(i) => presets[(i + 1) % presets.len()],
            None => presets[0],
        }
    }

    fn validate(self) -> Result<(), ParseError> {
        if self.beats == 0 {
            return Err(ParseError::ZeroBeats);
        }
        if self.beats > MAX_BEATS {
            return Err(out_of_range("beats per measure", 1.0, MAX_BEATS as f64));
        }
        Ok(())
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl FromStr for TimeSignature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedTimeSignature(s.to_string());
        let (beats, unit) = s.trim().split_once('/').ok_or_else(malformed)?;
        let beats: u32 = beats.trim().parse().map_err(|_| malformed())?;
        let unit: u32 = unit.trim().parse().map_err(|_| malformed())?;
        let ts = Self { beats, unit };
        ts.validate()?;
        Ok(ts)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}

fn out_of_range(field: &'static str, min: f64, max: f64) -> ParseError {
    ParseError::OutOfRange { field, min, max }
}

/// Saturates instead of overflowing; `GridConfig` keeps both factors capped so
/// a live grid never gets near that.
pub fn total_steps(measures: u32, time_signature: TimeSignature) -> usize {
    (measures as usize)
        .saturating_mul(time_signature.beats as usize)
        .saturating_mul(STEPS_PER_BEAT)
}

/// One sixteenth note at `bpm`: `(60000 / bpm) / 4` milliseconds.
pub fn step_interval(bpm: f32) -> Duration {
    let bpm = if bpm.is_finite() && bpm > 0.0 { bpm } else { DEFAULT_BPM };
    let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    Duration::try_from_secs_f64(60.0 / bpm as f64 / STEPS_PER_BEAT as f64)
        .unwrap_or(Duration::from_millis(125))
}

pub fn parse_measures(input: &str) -> Result<u32, ParseError> {
    let not_a_number = || ParseError::NotANumber { field: "measures", input: input.to_string() };
    let n: i64 = input.trim().parse().map_err(|_| not_a_number())?;
    if n <= 0 {
        return Err(ParseError::NotPositive { field: "measures" });
    }
    if n > MAX_MEASURES as i64 {
        return Err(out_of_range("measures", 1.0, MAX_MEASURES as f64));
    }
    u32::try_from(n).map_err(|_| not_a_number())
}

pub fn parse_bpm(input: &str) -> Result<f32, ParseError> {
    let bpm: f32 = input
        .trim()
        .parse()
        .ok()
        .filter(|b: &f32| b.is_finite())
        .ok_or_else(|| ParseError::NotANumber { field: "bpm", input: input.to_string() })?;
    check_bpm(bpm)?;
    Ok(bpm)
}

fn check_bpm(bpm: f32) -> Result<(), ParseError> {
    if bpm <= 0.0 {
        return Err(ParseError::NotPositive { field: "bpm" });
    }
    if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
        return Err(out_of_range("bpm", MIN_BPM as f64, MAX_BPM as f64));
    }
    Ok(())
}

/// Live grid + tempo settings. Fields are only reachable through validating
/// setters so measures, beats and bpm always sit inside their limits.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    measures: u32,
    time_signature: TimeSignature,
    bpm: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            measures: 1,
            time_signature: TimeSignature::COMMON,
            bpm: DEFAULT_BPM,
        }
    }
}

impl GridConfig {
    pub fn new(measures: u32, time_signature: TimeSignature, bpm: f32) -> Result<Self, ParseError> {
        let mut config = Self::default();
        config.set_measures(measures)?;
        config.set_time_signature(time_signature)?;
        config.set_bpm(bpm)?;
        Ok(config)
    }

    pub fn measures(&self) -> u32 { self.measures }
    pub fn time_signature(&self) -> TimeSignature { self.time_signature }
    pub fn bpm(&self) -> f32 { self.bpm }

    pub fn set_measures(&mut self, measures: u32) -> Result<(), ParseError> {
        if measures == 0 {
            return Err(ParseError::NotPositive { field: "measures" });
        }
        if measures > MAX_MEASURES {
            return Err(out_of_range("measures", 1.0, MAX_MEASURES as f64));
        }
        self.measures = measures;
        Ok(())
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) -> Result<(), ParseError> {
        time_signature.validate()?;
        self.time_signature = time_signature;
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: f32) -> Result<(), ParseError> {
        if !bpm.is_finite() {
            return Err(ParseError::NotANumber { field: "bpm", input: bpm.to_string() });
        }
        check_bpm(bpm)?;
        self.bpm = bpm;
        Ok(())
    }

    pub fn total_steps(&self) -> usize {
        total_steps(self.measures, self.time_signature)
    }

    pub fn step_interval(&self) -> Duration {
        step_interval(self.bpm)
    }
}

/// Where a flat step index sits musically, 1-based like a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPosition {
    pub measure: usize,
    pub beat: usize,
    pub step: usize,
}

impl StepPosition {
    pub fn of(index: usize, beats_per_measure: u32) -> Self {
        let per_measure = (beats_per_measure.max(1) as usize) * STEPS_PER_BEAT;
        let within = index % per_measure;
        Self {
            measure: index / per_measure + 1,
            beat: within / STEPS_PER_BEAT + 1,
            step: within % STEPS_PER_BEAT + 1,
        }
    }

    pub fn is_beat_start(&self) -> bool {
        self.step == 1
    }

    pub fn is_measure_start(&self) -> bool {
        self.beat == 1 && self.step == 1
    }
}

impl fmt::Display for StepPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "measure {}, beat {}, step {}", self.measure, self.beat, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_steps_formula() {
        for measures in 1..=4 {
            for sig in TIME_SIGNATURE_PRESETS {
                let ts: TimeSignature = sig.parse().unwrap();
                assert_eq!(
                    total_steps(measures, ts),
                    measures as usize * ts.beats as usize * 4
                );
            }
        }
        assert_eq!(total_steps(2, "4/4".parse().unwrap()), 32);
    }

    fn numerator(s: &str) -> Result<u32, ParseError> {
        s.parse::<TimeSignature>().map(|ts| ts.beats)
    }

    #[test]
    fn test_numerator_parsing() {
        assert_eq!(numerator("3/4"), Ok(3));
        assert_eq!(numerator(" 7 / 8 "), Ok(7));
        // denominator has to be a number but doesn't change anything
        assert_eq!(numerator("6/99"), Ok(6));
    }

    #[test]
    fn test_malformed_time_signatures() {
        for bad in ["", "4", "4/", "/4", "four/4", "4/four", "4-4"] {
            assert!(
                matches!(numerator(bad), Err(ParseError::MalformedTimeSignature(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(numerator("0/4"), Err(ParseError::ZeroBeats));
    }

    #[test]
    fn test_step_interval() {
        assert_eq!(step_interval(120.0), Duration::from_millis(125));
        assert_eq!(step_interval(60.0), Duration::from_millis(250));
        // a bad tempo never panics
        assert_eq!(step_interval(0.0), step_interval(DEFAULT_BPM));
    }

    #[test]
    fn test_parse_measures_and_bpm() {
        assert_eq!(parse_measures(" 3 "), Ok(3));
        assert_eq!(parse_measures("0"), Err(ParseError::NotPositive { field: "measures" }));
        assert!(matches!(parse_measures("two"), Err(ParseError::NotANumber { .. })));
        assert_eq!(parse_bpm("90.5"), Ok(90.5));
        assert_eq!(parse_bpm("-1"), Err(ParseError::NotPositive { field: "bpm" }));
        assert!(matches!(parse_bpm("fast"), Err(ParseError::NotANumber { .. })));
        assert!(matches!(parse_bpm("inf"), Err(ParseError::NotANumber { .. })));
    }

    #[test]
    fn test_config_rejects_zero() {
        let mut config = GridConfig::default();
        assert!(config.set_measures(0).is_err());
        assert!(config.set_bpm(0.0).is_err());
        assert_eq!(config, GridConfig::default());
        assert!(GridConfig::new(2, TimeSignature { beats: 0, unit: 4 }, 120.0).is_err());
    }

    #[test]
    fn test_measures_and_beats_are_capped() {
        assert_eq!(parse_measures("64"), Ok(MAX_MEASURES));
        assert_eq!(
            parse_measures("65"),
            Err(ParseError::OutOfRange { field: "measures", min: 1.0, max: 64.0 })
        );
        assert!(matches!(parse_measures("4294967295"), Err(ParseError::OutOfRange { .. })));
        assert!(matches!(parse_measures("99999999999999"), Err(ParseError::OutOfRange { .. })));

        assert_eq!(numerator("32/4"), Ok(MAX_BEATS));
        assert!(matches!(numerator("33/4"), Err(ParseError::OutOfRange { .. })));
        assert!(matches!(numerator("4294967295/4"), Err(ParseError::OutOfRange { .. })));

        let mut config = GridConfig::default();
        assert!(config.set_measures(u32::MAX).is_err());
        assert!(config.set_time_signature(TimeSignature { beats: u32::MAX, unit: 4 }).is_err());
        assert_eq!(config, GridConfig::default());

        let biggest = GridConfig::new(MAX_MEASURES, TimeSignature { beats: MAX_BEATS, unit: 4 }, 120.0)
            .unwrap();
        assert_eq!(biggest.total_steps(), 64 * 32 * 4);
    }

    #[test]
    fn test_total_steps_saturates() {
        let huge = TimeSignature { beats: u32::MAX, unit: 4 };
        assert!(total_steps(u32::MAX, huge) >= u32::MAX as usize);
    }

    #[test]
    fn test_bpm_limits() {
        assert_eq!(parse_bpm("1"), Ok(MIN_BPM));
        assert_eq!(parse_bpm("999"), Ok(MAX_BPM));
        for bad in ["0.00000000000000000001", "0.5", "1000", "100000", "1e30"] {
            assert_eq!(
                parse_bpm(bad),
                Err(ParseError::OutOfRange { field: "bpm", min: 1.0, max: 999.0 }),
                "{bad:?} should be rejected"
            );
        }

        let mut config = GridConfig::default();
        assert!(config.set_bpm(1e-20).is_err());
        assert!(config.set_bpm(f32::MAX).is_err());
        assert_eq!(config, GridConfig::default());

        // never panics, even for values no setter would let through
        assert_eq!(step_interval(1e-20), step_interval(MIN_BPM));
        assert_eq!(step_interval(f32::MAX), step_interval(MAX_BPM));
        assert_eq!(step_interval(MIN_BPM), Duration::from_secs(15));
    }

    #[test]
    fn test_step_position() {
        let pos = StepPosition::of(0, 4);
        assert_eq!(pos, StepPosition { measure: 1, beat: 1, step: 1 });
        assert!(pos.is_measure_start());

        let pos = StepPosition::of(21, 4);
        assert_eq!(pos, StepPosition { measure: 2, beat: 2, step: 2 });
        assert!(!pos.is_beat_start());
        assert_eq!(pos.to_string(), "measure 2, beat 2, step 2");

        assert!(StepPosition::of(12, 3).is_measure_start());
        assert!(StepPosition::of(8, 3).is_beat_start());
    }

    #[test]
    fn test_preset_cycle() {
        assert_eq!(TimeSignature::COMMON.next_preset().to_string(), "3/4");
        assert_eq!("2/4".parse::<TimeSignature>().unwrap().next_preset(), TimeSignature::COMMON);
        assert_eq!(TimeSignature { beats: 11, unit: 8 }.next_preset(), TimeSignature::COMMON);
    }
}
