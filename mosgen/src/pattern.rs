//! Pure instance-ordering generators.
//!
//! Every function here takes a per-class instance-count vector and returns an emission order
//! over class indices; none of them touch a [`crate::model::Group`] or know anything about
//! devices. Order of emission is part of each function's contract and is pinned by the tests
//! below.

/// One position in a generated pattern: either a real class index or a padding dummy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The index of a real instance class.
    Class(usize),
    /// A padding position with no backing instance.
    Dummy,
}

/// Lays out each class fully before moving to the next: `0,0,0,1,1,2,...`.
pub fn clustered_1d(counts: &[u32]) -> Vec<Token> {
    let mut out = Vec::new();
    for (i, &c) in counts.iter().enumerate() {
        for _ in 0..c {
            out.push(Token::Class(i));
        }
    }
    out
}

/// Round-robins classes in index order, skipping classes already exhausted for the round:
/// `0,1,2,0,1,0,...`.
pub fn interdigitated_simple_1d(counts: &[u32]) -> Vec<Token> {
    let mut remaining: Vec<u32> = counts.to_vec();
    let max = remaining.iter().copied().max().unwrap_or(0);
    let mut out = Vec::new();
    for _ in 0..max {
        for (i, rem) in remaining.iter_mut().enumerate() {
            if *rem > 0 {
                out.push(Token::Class(i));
                *rem -= 1;
            }
        }
    }
    out
}

/// Like [`interdigitated_simple_1d`], but rounds over classes sorted by descending count
/// (ties broken by original index) instead of original index order.
pub fn interdigitated_sorted_1d(counts: &[u32]) -> Vec<Token> {
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));
    let mut remaining: Vec<u32> = counts.to_vec();
    let max = remaining.iter().copied().max().unwrap_or(0);
    let mut out = Vec::new();
    for _ in 0..max {
        for &i in &order {
            if remaining[i] > 0 {
                out.push(Token::Class(i));
                remaining[i] -= 1;
            }
        }
    }
    out
}

/// Interdigitates classes (sorted by descending count) with each class's per-round repeat count
/// set to `round(count[i] / count[i+1])` (1 for the smallest class), so that larger classes
/// repeat proportionally more often per pass instead of just once.
pub fn interdigitated_balanced_1d(counts: &[u32]) -> Vec<Token> {
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));
    let sorted_counts: Vec<u32> = order.iter().map(|&i| counts[i]).collect();

    let n = sorted_counts.len();
    let mut occurrence = vec![1u32; n];
    for i in 0..n.saturating_sub(1) {
        let ratio = if sorted_counts[i + 1] == 0 {
            sorted_counts[i]
        } else {
            ((sorted_counts[i] as f64) / (sorted_counts[i + 1] as f64)).round() as u32
        };
        occurrence[i] = ratio.max(1);
    }

    let mut remaining = sorted_counts.clone();
    let mut out = Vec::new();
    loop {
        let mut progressed = false;
        for (slot, &class) in order.iter().enumerate() {
            for _ in 0..occurrence[slot] {
                if remaining[slot] > 0 {
                    out.push(Token::Class(class));
                    remaining[slot] -= 1;
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }
    out
}

/// Peels one token into an "odd pool" from every class with an odd count, then distributes the
/// remaining (now-even) counts alternately into a left and a right list (the alternation runs
/// globally across classes, not per class), and finally distributes the odd pool the same way.
/// The result concatenates the left list with the right list reversed, yielding a
/// mirror-symmetric pattern.
pub fn common_centroid_1d(counts: &[u32]) -> Vec<Token> {
    let mut even_counts = counts.to_vec();
    let mut odd_classes: Vec<usize> = Vec::new();
    for (i, c) in even_counts.iter_mut().enumerate() {
        if *c % 2 != 0 {
            odd_classes.push(i);
            *c -= 1;
        }
    }

    let mut left: Vec<Token> = Vec::new();
    let mut right: Vec<Token> = Vec::new();
    let mut post_left = true;
    for (i, &c) in even_counts.iter().enumerate() {
        for _ in 0..c {
            if post_left {
                left.push(Token::Class(i));
            } else {
                right.push(Token::Class(i));
            }
            post_left = !post_left;
        }
    }

    post_left = true;
    for i in odd_classes {
        if post_left {
            left.push(Token::Class(i));
        } else {
            right.push(Token::Class(i));
        }
        post_left = !post_left;
    }

    right.reverse();
    left.extend(right);
    left
}

/// Pads `counts` with a dummy class so the total is a multiple of `row`, flattens class-by-class,
/// then fills `row` rows sequentially (the first `col` tokens go to row 0, the next `col` to
/// row 1, and so on).
pub fn clustered_2d(counts: &[u32], row: usize) -> Vec<Vec<Token>> {
    assert!(row > 0, "row count must be positive");
    let total: u32 = counts.iter().sum();
    let remainder = total % (row as u32);
    let dummy = if remainder != 0 { (row as u32) - remainder } else { 0 };

    let mut flat = clustered_1d(counts);
    for _ in 0..dummy {
        flat.push(Token::Dummy);
    }

    let col = flat.len() / row;
    let mut rows = Vec::with_capacity(row);
    let mut iter = flat.into_iter();
    for _ in 0..row {
        rows.push((&mut iter).take(col).collect());
    }
    rows
}

/// Parses a custom 2-D literal pattern such as `"[012,210]"` into rows of tokens. Each row is a
/// comma-separated run of single characters: a digit names a class index, `d` is a dummy.
pub fn custom_2d(spec: &str) -> Vec<Vec<Token>> {
    let inner = spec.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|row| {
            row.trim()
                .chars()
                .map(|ch| match ch {
                    'd' => Token::Dummy,
                    digit => Token::Class(digit.to_digit(10).expect("custom pattern character must be a digit or `d`") as usize),
                })
                .collect()
        })
        .collect()
}

/// `true` if `s` names a custom 2-D literal pattern rather than one of the fixed keywords.
pub fn is_literal_pattern(s: &str) -> bool {
    s.starts_with('[')
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    #[test]
    fn clustered_groups_each_class_together() {
        assert_eq!(clustered_1d(&[2, 3]), vec![Class(0), Class(0), Class(1), Class(1), Class(1)]);
    }

    #[test]
    fn simple_interdigitation_round_robins_in_index_order() {
        assert_eq!(
            interdigitated_simple_1d(&[2, 1, 3]),
            vec![Class(0), Class(1), Class(2), Class(0), Class(2), Class(2)]
        );
    }

    #[test]
    fn sorted_interdigitation_visits_larger_classes_first() {
        assert_eq!(
            interdigitated_sorted_1d(&[1, 3]),
            vec![Class(1), Class(0), Class(1), Class(1)]
        );
    }

    #[test]
    fn balanced_interdigitation_repeats_larger_classes_proportionally() {
        // counts: class0=4, class1=2 -> sorted [0,1], ratio(0)=round(4/2)=2, ratio(1)=1
        let out = interdigitated_balanced_1d(&[4, 2]);
        assert_eq!(out, vec![Class(0), Class(0), Class(1), Class(0), Class(0), Class(1)]);
    }

    #[test]
    fn common_centroid_mirrors_around_center() {
        // counts: class0=2 (even-> 1 left,1 right), class1=1 (odd -> 1 to odd pool, goes left)
        let out = common_centroid_1d(&[2, 1]);
        // left: [0] (even half) then odd [1] -> left=[0,1]; right: [0] reversed -> [0]
        assert_eq!(out, vec![Class(0), Class(1), Class(0)]);
    }

    #[test]
    fn clustered_2d_pads_and_fills_rows_sequentially() {
        // total=5, row=2 -> remainder 1, dummy=1, flat len 6, col=3
        let rows = clustered_2d(&[2, 3], 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Class(0), Class(0), Class(1)]);
        assert_eq!(rows[1], vec![Class(1), Class(1), Dummy]);
    }

    #[test]
    fn custom_2d_parses_rows_and_dummies() {
        let rows = custom_2d("[01d,d10]");
        assert_eq!(rows, vec![vec![Class(0), Class(1), Dummy], vec![Dummy, Class(1), Class(0)]]);
    }

    #[test]
    fn literal_pattern_is_detected_by_bracket() {
        assert!(is_literal_pattern("[01,10]"));
        assert!(!is_literal_pattern("ID"));
    }
}
