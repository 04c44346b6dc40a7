use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// Structure for storing elements of type `Value`, the structure can only be indexed by structures
/// of type `Key`.
///
/// Used to keep per-button and per-slot data apart: a [`crate::ButtonId`] cannot accidentally
/// index a table of slot targets.
#[derive(Debug, Hash, PartialEq, Eq)]
pub struct KeyedVec<Key, Value> {
    /// [PhantomData] to ensure that the [KeyedVec] is bound to the structure
    key: PhantomData<Key>,
    /// Storage of the elements of type `Value`
    elements: Vec<Value>,
}

impl<Key, Value: Clone> Clone for KeyedVec<Key, Value> {
    fn clone(&self) -> Self {
        Self {
            key: PhantomData,
            elements: self.elements.clone(),
        }
    }
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        Self {
            key: PhantomData,
            elements: Vec::default(),
        }
    }
}

impl<Key, Value> KeyedVec<Key, Value> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the values in the vector.
    pub fn iter(&self) -> impl Iterator<Item = &'_ Value> {
        self.elements.iter()
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    /// Add a new value to the vector.
    ///
    /// Returns the key for the inserted value.
    pub fn push(&mut self, value: Value) -> Key {
        self.elements.push(value);

        Key::create_from_index(self.elements.len() - 1)
    }

    /// Iterate over the keys in increasing order.
    pub fn keys(&self) -> impl Iterator<Item = Key> {
        (0..self.elements.len()).map(Key::create_from_index)
    }
}

impl<Key, Value: Clone> KeyedVec<Key, Value> {
    /// Creates a vector with `len` copies of `value`.
    pub fn filled(len: usize, value: Value) -> Self {
        Self {
            key: PhantomData,
            elements: vec![value; len],
        }
    }
}

impl<Key, Value> From<Vec<Value>> for KeyedVec<Key, Value> {
    fn from(elements: Vec<Value>) -> Self {
        Self {
            key: PhantomData,
            elements,
        }
    }
}

impl<Key, Value> FromIterator<Value> for KeyedVec<Key, Value> {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self {
            key: PhantomData,
            elements: iter.into_iter().collect(),
        }
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, index: Key) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> Index<&Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, index: &Key) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, index: Key) -> &mut Self::Output {
        &mut self.elements[index.index()]
    }
}

impl StorageKey for usize {
    fn index(&self) -> usize {
        *self
    }

    fn create_from_index(index: usize) -> Self {
        index
    }
}

/// A simple trait which requires that the structures implementing this trait can generate an index.
pub trait StorageKey: Clone {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_values_are_retrieved_by_their_key() {
        let mut keyed_vec: KeyedVec<usize, &str> = KeyedVec::default();

        let first = keyed_vec.push("first");
        let second = keyed_vec.push("second");

        assert_eq!(keyed_vec[first], "first");
        assert_eq!(keyed_vec[second], "second");
        assert_eq!(keyed_vec.len(), 2);
    }

    #[test]
    fn keys_are_yielded_in_insertion_order() {
        let keyed_vec: KeyedVec<usize, u64> = vec![5, 0, 7].into();

        let keyed = keyed_vec
            .keys()
            .map(|key| (key, keyed_vec[key]))
            .collect::<Vec<_>>();
        assert_eq!(keyed, vec![(0, 5), (1, 0), (2, 7)]);
    }
}
