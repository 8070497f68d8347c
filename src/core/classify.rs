use crate::domain::model::{AgeBand, EducationGroup, SdBand};

/// Ages are not bounded below; anything under 65 lands in "15-65".
pub fn age_band(age: i64) -> AgeBand {
    if age >= 65 {
        AgeBand::From65
    } else {
        AgeBand::Under65
    }
}

/// Negative year counts fall through to "7+".
pub fn edu_group(years: i64) -> EducationGroup {
    if years == 0 {
        return EducationGroup::NoSchooling;
    }
    if (1..=6).contains(&years) {
        return EducationGroup::OneToSix;
    }
    EducationGroup::SevenPlus
}

/// Compares against the -1SD threshold first, then -2SD. The thresholds are
/// used as given; their relative order is not checked.
pub fn sd_band(aq: f64, minus_1sd: f64, minus_2sd: f64) -> SdBand {
    if aq >= minus_1sd {
        return SdBand::WithinOneSd;
    }
    if aq >= minus_2sd {
        return SdBand::OneToTwoSd;
    }
    SdBand::BelowTwoSd
}
