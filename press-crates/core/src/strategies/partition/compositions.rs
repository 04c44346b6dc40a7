/// Enumerates every way of writing `total` as an ordered sum of `parts` non-negative integers.
///
/// The first composition is `(0, ..., 0, total)`. Every next one is obtained by moving one unit
/// from the rightmost non-zero part to its left neighbour and collapsing whatever remained of that
/// part into the last position. The enumeration ends once the rightmost non-zero part is the first
/// part, i.e. at `(total, 0, ..., 0)`.
///
/// Since the compositions borrow an internal buffer, this is not an [`Iterator`]; use
/// [`Compositions::next_composition`] instead.
#[derive(Clone, Debug)]
pub struct Compositions {
    current: Vec<u64>,
    started: bool,
    exhausted: bool,
}

impl Compositions {
    pub fn new(total: u64, parts: usize) -> Compositions {
        let mut current = vec![0; parts];
        if let Some(last) = current.last_mut() {
            *last = total;
        }

        Compositions {
            current,
            started: false,
            exhausted: parts == 0,
        }
    }

    pub fn next_composition(&mut self) -> Option<&[u64]> {
        if self.exhausted {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(&self.current);
        }

        if !self.advance() {
            self.exhausted = true;
            return None;
        }

        Some(&self.current)
    }

    fn advance(&mut self) -> bool {
        let Some(index) = self.current.iter().rposition(|&part| part != 0) else {
            return false;
        };
        if index == 0 {
            return false;
        }

        let value = self.current[index];
        let last = self.current.len() - 1;
        self.current[index - 1] += 1;
        self.current[index] = 0;
        self.current[last] = value - 1;
        true
    }
}

/// The number of compositions of `total` into `parts` ordered parts, `C(total + parts - 1, parts - 1)`,
/// or [`None`] if that number does not fit a `u64`.
pub fn count_compositions(total: u64, parts: usize) -> Option<u64> {
    if parts == 0 {
        return Some(0);
    }

    let choose = (parts - 1) as u128;
    // C(n, k) computed incrementally; every intermediate value is itself a binomial coefficient
    (1..=choose).try_fold(1_u64, |count, i| {
        let product = u128::from(count).checked_mul(u128::from(total) + i)?;
        u64::try_from(product / i).ok()
    })
}
