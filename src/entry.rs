/// A named key holding zero or more values in the order they were added.
///
/// An entry without values is a flag-style directive (a line without `=`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    values: Vec<String>,
}

impl Entry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends `value`; duplicates are kept.
    pub fn add_value(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// Removes the first value equal to `value`, if any.
    pub fn remove_value(&mut self, value: &str) {
        if let Some(i) = self.values.iter().position(|v| v == value) {
            self.values.remove(i);
        }
    }

    pub fn remove_all_values(&mut self) {
        self.values.clear();
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.values.iter().map(String::as_str)
    }

    #[must_use]
    pub fn value_array(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Appends the values of `other`, which is consumed.
    pub(crate) fn merge(&mut self, other: Entry) {
        self.values.extend(other.values);
    }
}

impl<S: Into<String>> Extend<S> for Entry {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.values.extend(iter.into_iter().map(Into::into));
    }
}
