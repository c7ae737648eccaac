use crate::errors::ValidationError;
use crate::models::{ScoreDraft, ScoreFields, ValidatedScore};

pub const MAX_SECTION_SCORE: u8 = 40;
pub const MAX_WRITING_BAND: f64 = 9.0;

const NON_NUMERIC: &str = "Please enter valid scores for Listening and Reading";
const SECTION_RANGE: &str = "Listening and Reading scores must be between 0 and 40";
const WRITING_NON_NUMERIC: &str = "Writing score must be a number";
const WRITING_RANGE: &str = "Writing score must be between 0 and 9";
const WRITING_STEP: &str = "Writing score must be in steps of 0.5";

/// Checks a draft and stamps it with the next day number (`own_count + 1`).
pub fn validate(draft: &ScoreDraft, own_count: usize) -> Result<ValidatedScore, ValidationError> {
    let listening = parse_section(&draft.listening)?;
    let reading = parse_section(&draft.reading)?;

    let (Ok(listening), Ok(reading)) = (u8::try_from(listening), u8::try_from(reading)) else {
        return Err(ValidationError::OutOfRange(SECTION_RANGE));
    };
    if listening > MAX_SECTION_SCORE || reading > MAX_SECTION_SCORE {
        return Err(ValidationError::OutOfRange(SECTION_RANGE));
    }

    let writing = parse_writing(&draft.writing)?;

    Ok(ValidatedScore {
        fields: ScoreFields {
            listening,
            reading,
            writing,
        },
        day: u32::try_from(own_count + 1).unwrap_or(u32::MAX),
    })
}

fn parse_section(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::MissingOrNonNumeric(NON_NUMERIC))
}

fn parse_writing(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }

    let band = raw
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(ValidationError::MissingOrNonNumeric(WRITING_NON_NUMERIC))?;

    if !(0.0..=MAX_WRITING_BAND).contains(&band) {
        return Err(ValidationError::OutOfRange(WRITING_RANGE));
    }
    if (band * 2.0).fract() != 0.0 {
        return Err(ValidationError::OutOfRange(WRITING_STEP));
    }
    // Normalizes "-0" to 0.
    Ok(band.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(listening: &str, reading: &str, writing: &str) -> ScoreDraft {
        ScoreDraft {
            listening: listening.to_string(),
            reading: reading.to_string(),
            writing: writing.to_string(),
        }
    }

    #[test]
    fn listening_above_forty_is_out_of_range() {
        let err = validate(&draft("41", "20", ""), 0).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange(_)));
        assert_eq!(err.to_string(), SECTION_RANGE);
    }

    #[test]
    fn negative_reading_is_out_of_range() {
        let err = validate(&draft("20", "-1", ""), 0).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange(_)));
    }

    #[test]
    fn writing_above_nine_is_out_of_range() {
        let err = validate(&draft("20", "20", "10"), 0).unwrap_err();
        assert_eq!(err, ValidationError::OutOfRange(WRITING_RANGE));
    }

    #[test]
    fn non_numeric_listening_is_rejected() {
        let err = validate(&draft("abc", "20", ""), 0).unwrap_err();
        assert_eq!(err, ValidationError::MissingOrNonNumeric(NON_NUMERIC));
    }

    #[test]
    fn missing_reading_is_rejected() {
        let err = validate(&draft("20", "  ", ""), 0).unwrap_err();
        assert!(matches!(err, ValidationError::MissingOrNonNumeric(_)));
    }

    #[test]
    fn blank_writing_normalizes_to_zero() {
        let score = validate(&draft(" 28 ", "32", ""), 4).unwrap();
        assert_eq!(score.fields.listening, 28);
        assert_eq!(score.fields.reading, 32);
        assert_eq!(score.fields.writing, 0.0);
        assert_eq!(score.day, 5);
    }

    #[test]
    fn writing_accepts_half_bands_only() {
        let score = validate(&draft("40", "0", "7.5"), 0).unwrap();
        assert_eq!(score.fields.writing, 7.5);
        assert_eq!(score.day, 1);

        let err = validate(&draft("40", "0", "6.3"), 0).unwrap_err();
        assert_eq!(err, ValidationError::OutOfRange(WRITING_STEP));
    }

    #[test]
    fn non_finite_writing_is_not_a_number() {
        for raw in ["abc", "NaN", "inf"] {
            let err = validate(&draft("20", "20", raw), 0).unwrap_err();
            assert!(matches!(err, ValidationError::MissingOrNonNumeric(_)), "{raw}");
        }
    }
}
