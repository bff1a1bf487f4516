use {
    crate::view::{Observer, Subscription, View},
    serde::{Deserialize, Serialize},
    std::sync::Arc,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Kind of a structural change, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Added,
    Removed,
    Replaced,
    Moved,
    Reset,
}

/// Structural change of an ordered collection.
///
/// Batches are ordered the way the collection applied them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListChange<T> {
    Added(Vec<T>),
    Removed(Vec<T>),
    /// `removed` left the collection and `added` took their place.
    Replaced { removed: Vec<T>, added: Vec<T> },
    /// Order changed, contents did not.
    Moved { from: usize, to: usize },
    /// The collection was cleared; `removed` is everything it held before.
    Reset { removed: Vec<T> },
}

impl<T> ListChange<T> {
    pub fn action(&self) -> ChangeAction {
        match self {
            ListChange::Added(_) => ChangeAction::Added,
            ListChange::Removed(_) => ChangeAction::Removed,
            ListChange::Replaced { .. } => ChangeAction::Replaced,
            ListChange::Moved { .. } => ChangeAction::Moved,
            ListChange::Reset { .. } => ChangeAction::Reset,
        }
    }

    pub fn added(&self) -> &[T] {
        match self {
            ListChange::Added(items) | ListChange::Replaced { added: items, .. } => items.as_slice(),
            _ => &[],
        }
    }

    pub fn removed(&self) -> &[T] {
        match self {
            ListChange::Removed(items)
            | ListChange::Replaced { removed: items, .. }
            | ListChange::Reset { removed: items } => items.as_slice(),
            _ => &[],
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ListView<Item>: View<Msg = ListChange<Item>>
where
    Item: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize;
    fn get(&self, idx: &usize) -> Option<Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A list that can be watched for structural changes.
pub trait ObservableList<Item>: ListView<Item>
where
    Item: Clone + Send + Sync + 'static,
{
    fn add_observer(&self, observer: Arc<dyn Observer<dyn ListView<Item>>>) -> Subscription;

    /// Current contents, in order.
    fn snapshot(&self) -> Vec<Item> {
        self.iter().collect()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ListViewExt<T>: ListView<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn iter<'a>(&'a self) -> ListViewIter<'a, T, Self> {
        ListViewIter {
            _phantom: std::marker::PhantomData,
            view: self,
            cur: 0,
        }
    }
}

impl<T, V: ListView<T> + ?Sized> ListViewExt<T> for V where T: Clone + Send + Sync + 'static {}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ListViewIter<'a, T, V>
where
    T: Clone + Send + Sync + 'static,
    V: ListView<T> + ?Sized,
{
    _phantom: std::marker::PhantomData<T>,
    view: &'a V,
    cur: usize,
}

impl<'a, T, V> Iterator for ListViewIter<'a, T, V>
where
    T: Clone + Send + Sync + 'static,
    V: ListView<T> + ?Sized,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cur;
        self.cur += 1;
        self.view.get(&i)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

use std::ops::Deref;

impl<Item: Clone + Send + Sync + 'static, V: ListView<Item> + ?Sized> ListView<Item> for Arc<V> {
    fn get(&self, idx: &usize) -> Option<Item> {
        self.deref().get(idx)
    }

    fn len(&self) -> usize {
        self.deref().len()
    }
}

impl<Item: Clone + Send + Sync + 'static, V: ObservableList<Item> + ?Sized> ObservableList<Item>
    for Arc<V>
{
    fn add_observer(&self, observer: Arc<dyn Observer<dyn ListView<Item>>>) -> Subscription {
        self.deref().add_observer(observer)
    }

    fn snapshot(&self) -> Vec<Item> {
        self.deref().snapshot()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
