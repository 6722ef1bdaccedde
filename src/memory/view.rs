//! Bounds-checked byte views.
//!
//! Views carry no ownership. Every access is checked against the view length
//! and reports failure instead of panicking; a failed access leaves both
//! buffers untouched.

use bytemuck::Pod;

/// Returns the `[offset, offset + len)` range if it fits inside `bound`.
fn window(offset: usize, len: usize, bound: usize) -> Option<std::ops::Range<usize>> {
    let end = offset.checked_add(len)?;
    (end <= bound).then_some(offset..end)
}

/// Read-only window over externally owned bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemView<'a> {
    bytes: &'a [u8],
}

impl<'a> MemView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    /// True if both views cover the same address range.
    pub fn same_region(&self, other: &MemView<'_>) -> bool {
        self.len() == other.len() && std::ptr::eq(self.as_ptr(), other.as_ptr())
    }

    /// Narrow the view. Returns an empty view if the window does not fit.
    pub fn sub(&self, offset: usize, len: usize) -> MemView<'a> {
        match window(offset, len, self.len()) {
            Some(range) => MemView::new(&self.bytes[range]),
            None => MemView::empty(),
        }
    }

    /// Copy `dst.len()` bytes starting at `offset` into `dst`.
    pub fn read(&self, dst: &mut [u8], offset: usize) -> bool {
        match window(offset, dst.len(), self.len()) {
            Some(range) => {
                dst.copy_from_slice(&self.bytes[range]);
                true
            }
            None => false,
        }
    }

    /// Typed bulk read; the bound check is scaled by `size_of::<T>()`.
    pub fn read_slice<T: Pod>(&self, dst: &mut [T], offset: usize) -> bool {
        self.read(bytemuck::cast_slice_mut(dst), offset)
    }

    /// Read one (possibly unaligned) value at `offset`.
    pub fn read_value<T: Pod>(&self, offset: usize) -> Option<T> {
        let range = window(offset, std::mem::size_of::<T>(), self.len())?;
        Some(bytemuck::pod_read_unaligned(&self.bytes[range]))
    }
}

/// Writable window over externally owned bytes.
#[derive(Debug, Default)]
pub struct MemViewMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> MemViewMut<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        &*self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    /// Read-only view of the same bytes.
    pub fn as_view(&self) -> MemView<'_> {
        MemView::new(&*self.bytes)
    }

    /// Narrow the view for the duration of the borrow.
    pub fn sub(&mut self, offset: usize, len: usize) -> MemViewMut<'_> {
        match window(offset, len, self.len()) {
            Some(range) => MemViewMut::new(&mut self.bytes[range]),
            None => MemViewMut::empty(),
        }
    }

    /// Narrow the view, consuming it.
    pub fn into_sub(self, offset: usize, len: usize) -> MemViewMut<'a> {
        let bytes = self.bytes;
        match window(offset, len, bytes.len()) {
            Some(range) => MemViewMut::new(&mut bytes[range]),
            None => MemViewMut::empty(),
        }
    }

    pub fn read(&self, dst: &mut [u8], offset: usize) -> bool {
        self.as_view().read(dst, offset)
    }

    pub fn read_slice<T: Pod>(&self, dst: &mut [T], offset: usize) -> bool {
        self.as_view().read_slice(dst, offset)
    }

    pub fn read_value<T: Pod>(&self, offset: usize) -> Option<T> {
        self.as_view().read_value(offset)
    }

    /// Copy `src` into the view starting at `offset`.
    pub fn write(&mut self, src: &[u8], offset: usize) -> bool {
        match window(offset, src.len(), self.len()) {
            Some(range) => {
                self.bytes[range].copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Typed bulk write; the bound check is scaled by `size_of::<T>()`.
    pub fn write_slice<T: Pod>(&mut self, src: &[T], offset: usize) -> bool {
        self.write(bytemuck::cast_slice(src), offset)
    }

    pub fn write_value<T: Pod>(&mut self, offset: usize, value: &T) -> bool {
        self.write(bytemuck::bytes_of(value), offset)
    }

    pub fn fill(&mut self, byte: u8) {
        self.bytes.fill(byte);
    }
}

impl<'a> From<MemViewMut<'a>> for MemView<'a> {
    fn from(view: MemViewMut<'a>) -> Self {
        MemView::new(view.bytes)
    }
}
