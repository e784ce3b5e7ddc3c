use super::WavefrontSet;

/// Advances M, I1 and D1 by one score without backtrace bookkeeping.
pub fn compute(set: &mut WavefrontSet) {
    let n = set.out_m.offsets.len();
    let (m_sub, m_gap1) = (&set.m_sub.offsets[..n + 2], &set.m_gap1.offsets[..n + 2]);
    let (i1_ext, d1_ext) = (&set.i1_ext.offsets[..n + 2], &set.d1_ext.offsets[..n + 2]);
    let out_m = &mut set.out_m.offsets[..n];
    let out_i1 = &mut set.out_i1.offsets[..n];
    let out_d1 = &mut set.out_d1.offsets[..n];

    // Output `i` is the diagonal `lo + i`, inputs start one diagonal earlier
    for i in 0..n {
        let ins1 = m_gap1[i].max(i1_ext[i]) + 1;
        let del1 = m_gap1[i + 2].max(d1_ext[i + 2]);
        let sub = m_sub[i + 1] + 1;

        out_i1[i] = ins1;
        out_d1[i] = del1;
        out_m[i] = del1.max(sub.max(ins1));
    }
}
