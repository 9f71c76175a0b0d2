//! Codec initialization data (SPS/PPS and friends)

/// Concatenate parameter sets in the given order, bytes untouched.
pub fn concat_parameter_sets(sets: &[&[u8]]) -> Vec<u8> {
    let total = sets.iter().map(|s| s.len()).sum();
    let mut extradata = Vec::with_capacity(total);
    for set in sets {
        extradata.extend_from_slice(set);
    }
    extradata
}

/// H.264 extradata: SPS followed by PPS
pub fn build_extradata(sps: &[u8], pps: &[u8]) -> Vec<u8> {
    concat_parameter_sets(&[sps, pps])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sps_precedes_pps() {
        let sps = [0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xc0, 0x1f];
        let pps = [0x00, 0x00, 0x00, 0x01, 0x68, 0xce, 0x3c, 0x80, 0xff];

        let extradata = build_extradata(&sps, &pps);
        assert_eq!(extradata.len(), sps.len() + pps.len());
        assert_eq!(&extradata[..sps.len()], &sps);
        assert_eq!(&extradata[sps.len()..], &pps);
    }

    #[test]
    fn test_empty_sets() {
        assert!(build_extradata(&[], &[]).is_empty());
        assert_eq!(build_extradata(&[1, 2], &[]), vec![1, 2]);
        assert_eq!(concat_parameter_sets(&[&[1], &[], &[2, 3]]), vec![1, 2, 3]);
    }
}
