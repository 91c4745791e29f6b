/// Some range defined by a minimum and maximum.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinMax<T> {
	pub min: T,
	pub max: T,
}

impl<T> MinMax<T> where T: Clone {
	pub fn new(a: T) -> Self {
		Self { min: a.clone(), max: a }
	}
}

pub trait ScalarMinMax<T> {
	fn contains(&self, other: &Self) -> bool;
}

impl<T> ScalarMinMax<T> for MinMax<T> where T: Copy + Ord {
	fn contains(&self, other: &Self) -> bool {
		self.min <= other.min && self.max >= other.max
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	
	#[test]
	fn contains_inclusive() {
		let a = MinMax { min: 0, max: 10 };
		assert!(a.contains(&MinMax::new(10)));
		assert!(a.contains(&MinMax { min: 0, max: 10 }));
		assert!(!a.contains(&MinMax { min: -1, max: 3 }));
	}
}
