use chrono::{DateTime, Utc};

use crate::predict::OrbitalElementSet;

pub const ISS_LINE1: &str =
    "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
pub const ISS_LINE2: &str =
    "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

pub fn iss() -> OrbitalElementSet {
    OrbitalElementSet::parse("ISS (ZARYA)", ISS_LINE1, ISS_LINE2).expect("valid ISS elements")
}

pub fn iss_epoch() -> DateTime<Utc> {
    iss().epoch()
}
