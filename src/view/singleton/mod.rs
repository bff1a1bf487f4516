use {
    crate::view::{Observer, Subscription, View},
    std::{ops::Deref, sync::Arc},
};

/// A single value. Its message carries no payload: observers only learn that
/// *something* about the value changed.
pub trait SingletonView: View<Msg = ()> {
    type Item;

    fn get(&self) -> Self::Item;
}

/// A value that announces its own mutations.
pub trait ObservableItem: SingletonView {
    fn add_observer(
        &self,
        observer: Arc<dyn Observer<dyn SingletonView<Item = Self::Item>>>,
    ) -> Subscription;

    /// `true` if both handles refer to the same underlying item, regardless
    /// of what its value compares equal to.
    fn same_item(&self, other: &Self) -> bool
    where
        Self: Sized;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: SingletonView + ?Sized> SingletonView for Arc<V> {
    type Item = V::Item;

    fn get(&self) -> Self::Item {
        self.deref().get()
    }
}

impl<V: ObservableItem + ?Sized> ObservableItem for Arc<V> {
    fn add_observer(
        &self,
        observer: Arc<dyn Observer<dyn SingletonView<Item = Self::Item>>>,
    ) -> Subscription {
        self.deref().add_observer(observer)
    }

    fn same_item(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}
