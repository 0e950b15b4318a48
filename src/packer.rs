//! Global ordering, binding interleave, per-bin placement loop, distribution
//! strategies, gravity reporting (component D).

use std::collections::HashMap;
use std::collections::HashSet;

use log::{info, warn};
use uuid::Uuid;

use crate::bin::{Bin, PutType};
use crate::geometry::{Extent3, Point3};
use crate::item::Item;
use crate::Error;

/// Bundled knobs for `Packer::pack`, mirroring the teacher's `PackerConfig`
/// shape: one `Default`-deriving struct rather than positional booleans.
#[derive(Debug, Clone)]
pub struct PackOptions {
    pub bigger_first: bool,
    pub distribute_items: bool,
    pub fix_point: bool,
    pub check_stable: bool,
    pub support_surface_ratio: f64,
    /// Groups of item-group names to interleave together.
    pub binding: Vec<Vec<String>>,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            bigger_first: false,
            distribute_items: true,
            fix_point: true,
            check_stable: true,
            support_surface_ratio: 0.75,
            binding: Vec::new(),
        }
    }
}

/// Owns the bins and the item pool, and drives the packing loop.
#[derive(Default)]
pub struct Packer {
    pub bins: Vec<Bin>,
    pub items: Vec<Item>,
    pub unfit_items: Vec<Item>,
    binding: Vec<Vec<String>>,
}

impl Packer {
    pub fn new() -> Self {
        Packer::default()
    }

    pub fn add_bin(&mut self, bin: Bin) {
        self.bins.push(bin);
    }

    pub fn add_bins(&mut self, bins: impl IntoIterator<Item = Bin>) {
        self.bins.extend(bins);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = Item>) {
        self.items.extend(items);
    }

    /// Packs all registered items into all registered bins per `options`.
    pub fn pack(&mut self, options: &PackOptions) -> Result<(), Error> {
        validate_binding(&options.binding, &self.items)?;
        self.binding = options.binding.clone();

        self.bins.sort_by(|a, b| {
            let (va, vb) = (a.volume(), b.volume());
            if options.bigger_first {
                vb.partial_cmp(&va).unwrap()
            } else {
                va.partial_cmp(&vb).unwrap()
            }
        });

        self.sort_items(options.bigger_first);

        if !self.binding.is_empty() {
            self.sort_binding();
        }

        let Packer {
            bins,
            items,
            unfit_items,
            binding,
        } = self;

        for bin in bins.iter_mut() {
            bin.fix_point = options.fix_point;
            bin.check_stable = options.check_stable;
            bin.support_surface_ratio = options.support_surface_ratio;

            for item in items.iter() {
                pack2bin(bin, item);
            }

            if !binding.is_empty() {
                resort_for_binding(items, options.bigger_first);
                bin.clear_bin();
                bin.unfitted_items = unfit_items.clone();
                for item in items.iter() {
                    pack2bin(bin, item);
                }
            }

            bin.gravity = gravity_center(bin);
            info!(
                "{}: fitted={} unfitted={} gravity={:?}",
                bin.name,
                bin.items.len(),
                bin.unfitted_items.len(),
                bin.gravity
            );

            if options.distribute_items {
                let fitted_ids: HashSet<Uuid> = bin
                    .items
                    .iter()
                    .filter(|p| p.item.group != "corner")
                    .map(|p| p.item.id)
                    .collect();
                items.retain(|it| !fitted_ids.contains(&it.id));
            }
        }

        for item in items.iter() {
            warn!("{}: never fit into any bin", item.partno);
        }
        *unfit_items = items.clone();

        Ok(())
    }

    /// Re-orders each bin's committed items per `bin.put_type`.
    pub fn put_order(&mut self) {
        for bin in &mut self.bins {
            match bin.put_type {
                PutType::General => {
                    bin.items.sort_by(|a, b| a.position.1.partial_cmp(&b.position.1).unwrap());
                    bin.items.sort_by(|a, b| a.position.2.partial_cmp(&b.position.2).unwrap());
                    bin.items.sort_by(|a, b| a.position.0.partial_cmp(&b.position.0).unwrap());
                }
                PutType::OpenTop => {
                    bin.items.sort_by(|a, b| a.position.0.partial_cmp(&b.position.0).unwrap());
                    bin.items.sort_by(|a, b| a.position.1.partial_cmp(&b.position.1).unwrap());
                    bin.items.sort_by(|a, b| a.position.2.partial_cmp(&b.position.2).unwrap());
                }
                PutType::Unspecified => {}
            }
        }
    }

    /// §4.E Global ordering: partition by stackability, count group
    /// occurrences, sort each sublist by `(volume, weight, group_count)`.
    fn sort_items(&mut self, bigger_first: bool) {
        let (mut stackable, mut unstackable): (Vec<Item>, Vec<Item>) =
            self.items.drain(..).partition(|it| it.stackable);

        sort_by_volume_weight_group_count(&mut stackable, bigger_first);
        sort_by_volume_weight_group_count(&mut unstackable, bigger_first);

        self.items = stackable;
        self.items.extend(unstackable);
    }

    /// §4.E Binding interleave.
    fn sort_binding(&mut self) {
        let buckets: Vec<Vec<Item>> = self
            .binding
            .iter()
            .map(|tuple| {
                self.items
                    .iter()
                    .filter(|it| tuple.iter().any(|g| g == &it.group))
                    .cloned()
                    .collect()
            })
            .collect();

        let bucket0_empty = buckets.first().map(|b| b.is_empty()).unwrap_or(true);

        let mut front = Vec::new();
        let mut back = Vec::new();
        for item in &self.items {
            let bound = self.binding.iter().any(|tuple| tuple.iter().any(|g| g == &item.group));
            if !bound {
                if bucket0_empty {
                    front.push(item.clone());
                } else {
                    back.push(item.clone());
                }
            }
        }

        let min_c = buckets.iter().filter(|b| !b.is_empty()).map(|b| b.len()).min().unwrap_or(0);

        let mut interleaved = Vec::new();
        for i in 0..min_c {
            for bucket in &buckets {
                if i < bucket.len() {
                    interleaved.push(bucket[i].clone());
                }
            }
        }

        let interleaved_ids: HashSet<Uuid> = interleaved.iter().map(|it| it.id).collect();
        for bucket in &buckets {
            for item in bucket {
                if !interleaved_ids.contains(&item.id) {
                    self.unfit_items.push(item.clone());
                }
            }
        }

        self.items = front;
        self.items.extend(interleaved);
        self.items.extend(back);
    }
}

/// Places `new_item` into `bin`: corner seeding / first-item-at-origin for an
/// empty bin, otherwise candidate pivots derived from already-committed items.
fn pack2bin(bin: &mut Bin, new_item: &Item) {
    if bin.corner > 0.0 && bin.items.is_empty() {
        let corners = bin.add_corners();
        for (i, corner) in corners.into_iter().enumerate() {
            bin.put_corner(i, corner);
        }
        // fall through: new_item still needs a pivot, now against the corners
    } else if bin.items.is_empty() {
        if !bin.put_item(new_item, (0.0, 0.0, 0.0)) {
            bin.unfitted_items.push(new_item.clone());
        }
        return;
    }

    let snapshot: Vec<(Point3, Extent3, bool)> = bin
        .items
        .iter()
        .map(|p| {
            let d = p.placed_dimension();
            (p.position, (d.w, d.h, d.d), p.item.stackable)
        })
        .collect();

    let mut fitted = false;
    for axis in 0..3usize {
        for &(pos, dim, stackable) in &snapshot {
            let pivot = match axis {
                0 => (pos.0 + dim.0, pos.1, pos.2),
                1 => {
                    if !stackable {
                        continue;
                    }
                    (pos.0, pos.1 + dim.1, pos.2)
                }
                _ => (pos.0, pos.1, pos.2 + dim.2),
            };
            if bin.put_item(new_item, pivot) {
                fitted = true;
                break;
            }
        }
        if fitted {
            break;
        }
    }

    if !fitted {
        bin.unfitted_items.push(new_item.clone());
    }
}

fn sort_by_volume_weight_group_count(items: &mut [Item], bigger_first: bool) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items.iter() {
        *counts.entry(item.group.clone()).or_insert(0) += 1;
    }
    items.sort_by(|a, b| {
        let ka = (a.volume(), a.weight, counts[&a.group] as f64);
        let kb = (b.volume(), b.weight, counts[&b.group] as f64);
        let ord = ka.partial_cmp(&kb).unwrap();
        if bigger_first {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Resort prior to the binding repack pass: primary key `priority` ascending,
/// secondary `loadbear` descending, tertiary `volume` per `bigger_first` —
/// expressed as three sequential stable sorts, the faithful translation of
/// the original's chained `list.sort()` calls (last sort wins on ties).
fn resort_for_binding(items: &mut [Item], bigger_first: bool) {
    items.sort_by(|a, b| {
        let ord = a.volume().partial_cmp(&b.volume()).unwrap();
        if bigger_first {
            ord.reverse()
        } else {
            ord
        }
    });
    items.sort_by(|a, b| b.loadbear.cmp(&a.loadbear));
    items.sort_by(|a, b| a.priority.cmp(&b.priority));
}

fn validate_binding(binding: &[Vec<String>], items: &[Item]) -> Result<(), Error> {
    for tuple in binding {
        let has_match = items.iter().any(|it| tuple.iter().any(|g| g == &it.group));
        if !has_match {
            return Err(Error::UnknownBindingGroup(tuple.join(",")));
        }
    }
    Ok(())
}

/// §4.E Gravity. Uses the documented off-by-one quadrant split (the low
/// quadrant on each axis is `[0, mid]`, inclusive of the midpoint) and
/// attributes each item's weight to the four quadrants proportionally to the
/// integer-grid footprint overlap — the single general rule the spec's prose
/// describes, which both reproduces the simple "fully inside one quadrant"
/// case exactly and sidesteps a latent unreachable-variable bug in the
/// source's four-way boundary-crossing branch (see DESIGN.md).
fn gravity_center(bin: &Bin) -> [f64; 4] {
    let w = bin.dimensions.w.floor() as i64;
    let h = bin.dimensions.h.floor() as i64;
    let x_mid = w / 2;
    let y_mid = h / 2;

    let mut area = [0.0f64; 4];

    for placed in &bin.items {
        let dim = placed.placed_dimension();
        let x_st = placed.position.0.floor() as i64;
        let y_st = placed.position.1.floor() as i64;
        let x_ed = (placed.position.0 + dim.w).floor() as i64;
        let y_ed = (placed.position.1 + dim.h).floor() as i64;

        let x_total = ((x_ed - x_st + 1).max(1)) as f64;
        let y_total = ((y_ed - y_st + 1).max(1)) as f64;

        let x_low = inclusive_overlap(x_st, x_ed, 0, x_mid) as f64;
        let x_high = inclusive_overlap(x_st, x_ed, x_mid + 1, w) as f64;
        let y_low = inclusive_overlap(y_st, y_ed, 0, y_mid) as f64;
        let y_high = inclusive_overlap(y_st, y_ed, y_mid + 1, h) as f64;

        let weight = placed.item.weight;
        let denom = x_total * y_total;
        area[0] += x_low * y_low / denom * weight;
        area[1] += x_high * y_low / denom * weight;
        area[2] += x_low * y_high / denom * weight;
        area[3] += x_high * y_high / denom * weight;
    }

    let sum: f64 = area.iter().sum();
    if sum == 0.0 {
        return [0.0; 4];
    }

    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = ((area[i] / sum * 100.0) * 100.0).round() / 100.0;
    }
    out
}

fn inclusive_overlap(a0: i64, a1: i64, b0: i64, b1: i64) -> i64 {
    (a1.min(b1) - a0.max(b0) + 1).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Shape;

    fn cube(partno: &str, w: f64, h: f64, d: f64, weight: f64, priority: i32) -> Item {
        Item::new(partno, "test", Shape::Cube, (w, h, d), weight, priority, 100, true, "red", true, None)
            .unwrap()
    }

    #[test]
    fn trivial_fit_scenario() {
        let mut packer = Packer::new();
        packer.add_bin(Bin::new("b", (5.0, 4.0, 3.0), 10.0, 0.0, 1).unwrap());
        packer.add_item(cube("only", 2.0, 2.0, 2.0, 1.0, 1));

        packer.pack(&PackOptions::default()).unwrap();

        let bin = &packer.bins[0];
        assert_eq!(bin.items.len(), 1);
        assert!(bin.unfitted_items.is_empty());
        assert_eq!(bin.items[0].position, (0.0, 0.0, 0.0));
        assert_eq!(bin.gravity, [100.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn multi_bin_distribute_keeps_no_item_twice() {
        let mut packer = Packer::new();
        packer.add_bin(Bin::new("b1", (5.0, 5.0, 5.0), 100.0, 0.0, 1).unwrap());
        packer.add_bin(Bin::new("b2", (3.0, 3.0, 5.0), 100.0, 0.0, 1).unwrap());
        for i in 0..10 {
            packer.add_item(cube(&format!("i{i}"), 1.0, 1.0, 1.0, 1.0, 1));
        }

        let options = PackOptions {
            bigger_first: true,
            distribute_items: true,
            ..Default::default()
        };
        packer.pack(&options).unwrap();

        let mut seen = HashSet::new();
        for bin in &packer.bins {
            for placed in &bin.items {
                assert!(seen.insert(placed.item.id), "item placed twice");
            }
        }
    }

    #[test]
    fn binding_overflow_lands_on_unfit_items() {
        let mut packer = Packer::new();
        packer.add_bin(Bin::new("b", (100.0, 100.0, 100.0), 1_000_000.0, 0.0, 0).unwrap());
        for i in 0..3 {
            let mut item = cube(&format!("server{i}"), 2.0, 2.0, 2.0, 1.0, 1);
            item.group = "server".into();
            packer.add_item(item);
        }
        for i in 0..5 {
            let mut item = cube(&format!("cabinet{i}"), 2.0, 2.0, 2.0, 1.0, 1);
            item.group = "cabinet".into();
            packer.add_item(item);
        }

        let options = PackOptions {
            binding: vec![vec!["server".into()], vec!["cabinet".into()]],
            distribute_items: false,
            ..Default::default()
        };
        packer.pack(&options).unwrap();

        // each tuple is its own bucket; the smaller server bucket (3) caps
        // the interleave, so the 2 overflow cabinets must be reported unfit
        // rather than silently dropped.
        assert!(packer.unfit_items.iter().any(|it| it.group == "cabinet"));
    }

    #[test]
    fn corner_reinforcement_seeds_eight_corners_before_the_item() {
        let mut bin = Bin::new("b", (10.0, 10.0, 10.0), 1_000.0, 1.0, 0).unwrap();
        let item = cube("only", 1.0, 1.0, 1.0, 1.0, 1);

        pack2bin(&mut bin, &item);

        assert_eq!(bin.items.len(), 9);
        assert!(bin.items[..8].iter().all(|p| p.item.group == "corner"));
        assert_eq!(bin.items[8].item.partno, "only");
        // sentinel floor row + 8 corners + 1 item
        assert_eq!(bin.fit_items().len(), 10);
    }

    #[test]
    fn unknown_binding_group_is_rejected() {
        let mut packer = Packer::new();
        packer.add_bin(Bin::new("b", (5.0, 5.0, 5.0), 100.0, 0.0, 1).unwrap());
        packer.add_item(cube("x", 1.0, 1.0, 1.0, 1.0, 1));

        let options = PackOptions {
            binding: vec![vec!["nonexistent".into()]],
            ..Default::default()
        };
        let err = packer.pack(&options).unwrap_err();
        assert!(matches!(err, Error::UnknownBindingGroup(_)));
    }
}
