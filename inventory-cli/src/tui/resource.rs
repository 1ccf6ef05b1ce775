/// Data that is fetched asynchronously
#[derive(Debug, Clone, Default)]
pub enum Resource<T> {
    #[default]
    Loading,
    Success(T),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            Resource::Loading => None,
        }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Resource::Success(value) => Some(value),
            Resource::Loading => None,
        }
    }
}
