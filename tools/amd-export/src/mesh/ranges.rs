//! Per-material triangle ranges

/// Triangles `[start, end)` drawn with `material`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialRange {
    pub start: usize,
    pub end: usize,
    pub material: usize,
}

impl MaterialRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Accumulator folded over the face scan.
///
/// A range closes exactly when a face's material differs from the previous
/// face's, so the ranges partition the triangle list in face order.
#[derive(Debug, Default)]
pub struct MaterialRangeBuilder {
    current: Option<usize>,
    ranges: Vec<MaterialRange>,
}

impl MaterialRangeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the face occupying triangle slot `triangle`
    pub fn push_face(&mut self, material: usize, triangle: usize) {
        if self.current == Some(material) {
            return;
        }
        if let Some(last) = self.ranges.last_mut() {
            last.end = triangle;
        }
        self.ranges.push(MaterialRange {
            start: triangle,
            end: triangle,
            material,
        });
        self.current = Some(material);
    }

    /// Close the open range at `total_triangles`
    pub fn finish(mut self, total_triangles: usize) -> Vec<MaterialRange> {
        if let Some(last) = self.ranges.last_mut() {
            last.end = total_triangles;
        }
        self.ranges
    }
}

/// Fold a face-material sequence into ranges
pub fn material_ranges(face_materials: impl IntoIterator<Item = usize>) -> Vec<MaterialRange> {
    let (builder, count) = face_materials.into_iter().fold(
        (MaterialRangeBuilder::new(), 0usize),
        |(mut builder, triangle), material| {
            builder.push_face(material, triangle);
            (builder, triangle + 1)
        },
    );
    builder.finish(count)
}
