/// Every integer offset with max-norm `shell`, in lexicographic order.
///
/// Shell 0 is the origin alone; shell `s > 0` holds `(2s+1)³ - (2s-1)³` offsets.
pub fn shell_offsets(shell: usize) -> Vec<[i64; 3]> {
    let s = shell as i64;
    let mut offsets = Vec::new();
    for i in -s..=s {
        for j in -s..=s {
            for k in -s..=s {
                if i.abs().max(j.abs()).max(k.abs()) == s {
                    offsets.push([i, j, k]);
                }
            }
        }
    }
    offsets
}

/// Offsets of shells `0..=max_shell` in breadth-first order.
pub fn breadth_first_offsets(max_shell: usize) -> impl Iterator<Item = [i64; 3]> {
    (0..=max_shell).flat_map(shell_offsets)
}
