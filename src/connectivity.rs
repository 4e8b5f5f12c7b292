use crate::arrays::Array2D;
use crate::common::Segmentation;
use crate::disjoint::DisjointSet;
use crate::error::Error;

/// Flattens a populated disjoint-set forest over pixel indices into dense
/// labels.
///
/// Labels are assigned in row-major first-appearance order of each root, so
/// the output is deterministic and free of phantom labels.
pub fn compact_labels(
    ds: &mut DisjointSet,
    width: usize,
    height: usize,
) -> Result<Segmentation, Error> {
    debug_assert_eq!(ds.len(), width * height);
    let mut labels = Array2D::from_fill(0u32, width, height)?;
    let mut substitute = vec![u32::MAX; ds.len()];
    let mut next_label = 0u32;
    for i in 0..ds.len() {
        let root = ds.find(i as u32) as usize;
        if substitute[root] == u32::MAX {
            substitute[root] = next_label;
            next_label += 1;
        }
        labels.data[i] = substitute[root];
    }
    Ok(Segmentation {
        labels,
        num_labels: next_label,
    })
}

/// Builds a disjoint-set forest merging 4-adjacent pixels that share an
/// assignment value.
fn assign_disjoint_set(assignments: &Array2D<u32>) -> DisjointSet {
    let width = assignments.width;
    let mut ds = DisjointSet::new(assignments.data.len());
    for y in 0..assignments.height {
        let row = assignments.get_row(y);
        let row_index = y * width;
        for x in 0..width {
            let index = (row_index + x) as u32;
            if x + 1 < width && row[x] == row[x + 1] {
                ds.union(index, index + 1);
            }
            if y + 1 < assignments.height && row[x] == assignments[(x, y + 1)] {
                ds.union(index, index + width as u32);
            }
        }
    }
    ds
}

/// Connected-component relabeling pass.
///
/// Splits every assignment value into its 4-connected components, then gives
/// each component at least `min_size` pixels a fresh dense label; smaller
/// components take the label of their left (or, on the first column, upper)
/// neighbor, which is already final thanks to the row-major scan. The first
/// component of the image keeps its own label even when undersized, since it
/// has no finalized neighbor to merge into.
pub fn relabel_components(
    assignments: &Array2D<u32>,
    min_size: u32,
) -> Result<Segmentation, Error> {
    let width = assignments.width;
    let height = assignments.height;
    let mut ds = assign_disjoint_set(assignments);
    let mut labels = Array2D::from_fill(0u32, width, height)?;
    let mut substitute = vec![u32::MAX; width * height];
    let mut next_label = 0u32;
    for i in 0..width * height {
        let root = ds.find(i as u32) as usize;
        if substitute[root] == u32::MAX {
            substitute[root] = if ds.size_of(root as u32) >= min_size || i == 0 {
                let label = next_label;
                next_label += 1;
                label
            } else if i % width > 0 {
                labels.data[i - 1]
            } else {
                labels.data[i - width]
            };
        }
        labels.data[i] = substitute[root];
    }
    Ok(Segmentation {
        labels,
        num_labels: next_label,
    })
}
