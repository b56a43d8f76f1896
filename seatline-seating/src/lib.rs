pub mod allocator;
pub mod layout;

pub use allocator::{AllocationError, SeatAllocator, SectionOccupancy};
pub use layout::{SectionLayout, DEFAULT_SECTION_CAPACITY};
