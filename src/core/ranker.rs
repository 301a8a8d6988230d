//! Quality ranking.
//!
//! Maps quality attributes to an integer preference score. Weights are
//! additive: every flag that is set contributes its full weight.

use crate::models::media::{Quality, Resolution};

pub const HDR: i32 = 100;
pub const DUBBED: i32 = 90;
pub const THREE_D: i32 = 80;
pub const REMUX: i32 = 50;
pub const FOUR_K: i32 = 40;
pub const FULL_HD: i32 = 30;
pub const MULTI_CD: i32 = 10;
/// Applied to every sub-1080p resolution tag (not to a missing tag).
pub const LOW_RESOLUTION: i32 = -50;

/// Compute the rank of a set of quality attributes.
pub fn rank(quality: &Quality) -> i32 {
    let mut rank = 0;
    if quality.hdr {
        rank += HDR;
    }
    if quality.dubbed {
        rank += DUBBED;
    }
    if quality.three_d {
        rank += THREE_D;
    }
    if quality.remux {
        rank += REMUX;
    }
    if quality.multi_cd {
        rank += MULTI_CD;
    }
    rank += match quality.resolution {
        Some(Resolution::P2160) => FOUR_K,
        Some(Resolution::P1080) => FULL_HD,
        Some(r) if r.is_low_quality() => LOW_RESOLUTION,
        _ => 0,
    };
    rank
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(f: impl FnOnce(&mut Quality)) -> Quality {
        let mut q = Quality::default();
        f(&mut q);
        q
    }

    #[test]
    fn test_empty_quality_is_zero() {
        assert_eq!(rank(&Quality::default()), 0);
    }

    #[test]
    fn test_single_flag_weights() {
        assert_eq!(rank(&only(|q| q.hdr = true)), HDR);
        assert_eq!(rank(&only(|q| q.dubbed = true)), DUBBED);
        assert_eq!(rank(&only(|q| q.three_d = true)), THREE_D);
        assert_eq!(rank(&only(|q| q.remux = true)), REMUX);
        assert_eq!(rank(&only(|q| q.multi_cd = true)), MULTI_CD);
        assert_eq!(rank(&only(|q| q.resolution = Some(Resolution::P2160))), FOUR_K);
        assert_eq!(rank(&only(|q| q.resolution = Some(Resolution::P1080))), FULL_HD);
    }

    #[test]
    fn test_every_low_resolution_is_penalised() {
        for r in [
            Resolution::P720,
            Resolution::P480,
            Resolution::P360,
            Resolution::P240,
            Resolution::P144,
        ] {
            assert_eq!(rank(&only(|q| q.resolution = Some(r))), LOW_RESOLUTION);
        }
    }

    #[test]
    fn test_weights_are_additive() {
        let flags: [(fn(&mut Quality), i32); 5] = [
            (|q: &mut Quality| q.hdr = true, HDR),
            (|q: &mut Quality| q.dubbed = true, DUBBED),
            (|q: &mut Quality| q.three_d = true, THREE_D),
            (|q: &mut Quality| q.remux = true, REMUX),
            (|q: &mut Quality| q.multi_cd = true, MULTI_CD),
        ];
        let resolutions = [
            (None, 0),
            (Some(Resolution::P2160), FOUR_K),
            (Some(Resolution::P1080), FULL_HD),
            (Some(Resolution::P480), LOW_RESOLUTION),
        ];

        for mask in 0u32..(1 << flags.len()) {
            for (resolution, resolution_weight) in resolutions {
                let mut quality = Quality {
                    resolution,
                    ..Default::default()
                };
                let mut expected = resolution_weight;
                for (i, (set, weight)) in flags.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        set(&mut quality);
                        expected += weight;
                    }
                }
                assert_eq!(rank(&quality), expected);
            }
        }
    }

    #[test]
    fn test_low_resolution_remux_ranks_below_plain_full_hd() {
        let remux_720 = only(|q| {
            q.remux = true;
            q.resolution = Some(Resolution::P720);
        });
        let plain_1080 = only(|q| q.resolution = Some(Resolution::P1080));
        assert!(rank(&remux_720) < rank(&plain_1080));
    }

    #[test]
    fn test_rank_is_deterministic() {
        let q = only(|q| {
            q.hdr = true;
            q.resolution = Some(Resolution::P2160);
        });
        assert_eq!(rank(&q), rank(&q.clone()));
    }
}
