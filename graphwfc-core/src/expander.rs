//! Proportional frontier expansion: allocates a growth budget across a set
//! of parent cells by largest-remainder apportionment.

use std::cmp::Ordering;

use crate::cell::CellId;

/// Computes, for each parent in `parents`, how many new child cells it
/// should receive from `budget`.
///
/// `parents` is `(cell id, center_degree)` pairs, in the order the caller
/// wants ties resolved (largest-remainder surplus distribution and the
/// resulting allocation both follow this order).
///
/// No-ops (every allocation is 0) when total demand is zero or `budget` is
/// not positive.
#[must_use]
pub fn allocate(parents: &[(CellId, usize)], budget: i64) -> Vec<(CellId, usize)> {
    let demand: usize = parents.iter().map(|&(_, degree)| degree).sum();
    if demand == 0 || budget <= 0 {
        return parents.iter().map(|&(cell, _)| (cell, 0)).collect();
    }

    let budget_usize = usize::try_from(budget).unwrap_or(0);
    let budget_f = budget as f64;
    let demand_f = demand as f64;

    struct Entry {
        cell: CellId,
        alloc: usize,
        cap: usize,
        remainder: f64,
    }

    let mut entries: Vec<Entry> = Vec::with_capacity(parents.len());
    for &(cell, degree) in parents {
        let share = budget_f * (degree as f64) / demand_f;
        let floor_share = share.floor();
        let base = floor_share.max(1.0) as usize;
        let cap = degree.div_ceil(2);
        entries.push(Entry {
            cell,
            alloc: base.min(cap),
            cap,
            remainder: share - floor_share,
        });
    }

    let allocated: usize = entries.iter().map(|e| e.alloc).sum();
    let mut surplus = budget_usize.saturating_sub(allocated);

    if surplus > 0 {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| {
            entries[b]
                .remainder
                .partial_cmp(&entries[a].remainder)
                .unwrap_or(Ordering::Equal)
        });

        while surplus > 0 {
            let mut progressed = false;
            for &idx in &order {
                if surplus == 0 {
                    break;
                }
                if entries[idx].alloc < entries[idx].cap {
                    entries[idx].alloc += 1;
                    surplus -= 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }

    entries.into_iter().map(|e| (e.cell, e.alloc)).collect()
}
