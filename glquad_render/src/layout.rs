use crate::device::ElementKind;

/// One attribute of a vertex record: `count` components of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferElement {
    pub count: u32,
    pub kind: ElementKind,
    pub normalized: bool,
}

impl VertexBufferElement {
    /// Bytes this attribute takes up inside one vertex record.
    pub fn size(&self) -> usize {
        self.count as usize * self.kind.size()
    }
}

/// Scalar types that can be pushed onto a layout by type rather than by [`ElementKind`].
pub trait VertexElementType {
    const KIND: ElementKind;
}

impl VertexElementType for f32 {
    const KIND: ElementKind = ElementKind::Float32;
}

impl VertexElementType for i32 {
    const KIND: ElementKind = ElementKind::Int32;
}

impl VertexElementType for u32 {
    const KIND: ElementKind = ElementKind::UnsignedInt32;
}

impl VertexElementType for u16 {
    const KIND: ElementKind = ElementKind::UnsignedShort;
}

impl VertexElementType for u8 {
    const KIND: ElementKind = ElementKind::UnsignedByte;
}

/// Describes how one vertex record is laid out in a [`crate::VertexBuffer`].
///
/// Attributes are interleaved: element 0 sits at the start of every record, element 1 right after
/// it, and so on. The order you push them in is the order of the attribute slots the shader sees.
///
/// ```
/// use render::VertexBufferLayout;
///
/// let mut layout = VertexBufferLayout::new();
/// layout.push_type::<f32>(2); // position
/// layout.push_type::<f32>(2); // texture coordinates
/// layout.push_type::<u8>(4);  // colour
///
/// assert_eq!(layout.stride(), 20);
/// assert_eq!(layout.offsets(), vec![0, 8, 16]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexBufferLayout {
    elements: Vec<VertexBufferElement>,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `count` components of `kind`, normalized only if that's the kind's usual meaning.
    pub fn push(&mut self, kind: ElementKind, count: u32) -> &mut Self {
        self.push_normalized(kind, count, kind.normalized_by_default())
    }

    pub fn push_normalized(&mut self, kind: ElementKind, count: u32, normalized: bool) -> &mut Self {
        debug_assert!(count > 0, "a vertex attribute needs at least one component");
        self.elements.push(VertexBufferElement { count, kind, normalized });
        self
    }

    pub fn push_type<T: VertexElementType>(&mut self, count: u32) -> &mut Self {
        self.push(T::KIND, count)
    }

    pub fn elements(&self) -> &[VertexBufferElement] {
        &self.elements
    }

    /// Total bytes per vertex record. Zero for an empty layout.
    pub fn stride(&self) -> usize {
        self.elements.iter().map(VertexBufferElement::size).sum()
    }

    /// Byte offset of each element from the start of its record, in push order.
    pub fn offsets(&self) -> Vec<usize> {
        self.elements
            .iter()
            .scan(0, |offset, element| {
                let start = *offset;
                *offset += element.size();
                Some(start)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_layout_has_no_stride() {
        let layout = VertexBufferLayout::new();

        assert!(layout.is_empty());
        assert_eq!(layout.stride(), 0);
        assert!(layout.offsets().is_empty());
    }

    #[test]
    fn stride_follows_every_push() {
        let mut layout = VertexBufferLayout::new();

        layout.push(ElementKind::Float32, 2);
        assert_eq!(layout.stride(), 8);

        layout.push(ElementKind::Float32, 2);
        assert_eq!(layout.stride(), 16);

        layout.push(ElementKind::UnsignedByte, 4);
        assert_eq!(layout.stride(), 20);
        assert_eq!(layout.offsets(), vec![0, 8, 16]);
    }

    #[test]
    fn elements_keep_insertion_order() {
        let mut layout = VertexBufferLayout::new();
        layout.push_type::<u8>(4).push_type::<f32>(3);

        let kinds: Vec<_> = layout.elements().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ElementKind::UnsignedByte, ElementKind::Float32]);
        assert_eq!(layout.offsets(), vec![0, 4]);
    }

    #[test]
    fn explicit_normalization_overrides_the_default() {
        let mut layout = VertexBufferLayout::new();
        layout.push(ElementKind::UnsignedByte, 4);
        layout.push_normalized(ElementKind::UnsignedByte, 4, false);
        layout.push_normalized(ElementKind::UnsignedShort, 2, true);

        let normalized: Vec<_> = layout.elements().iter().map(|e| e.normalized).collect();
        assert_eq!(normalized, vec![true, false, true]);
        assert_eq!(layout.stride(), 4 + 4 + 4);
    }
}
