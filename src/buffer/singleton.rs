use {
    crate::{
        error::Result,
        view::{
            singleton::{ObservableItem, SingletonView},
            NotifyFnObserver, Observer, ObserverBroadcast, Subscription, View,
        },
    },
    parking_lot::RwLock,
    std::{
        fmt,
        ops::{Deref, DerefMut},
        sync::Arc,
    },
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Shared, observable value.
///
/// Clones share the value and the observer list. Every write notifies the
/// observers with `()`; which field changed is not reported.
///
/// Equality compares the contained values, so `T`'s `PartialEq` decides the
/// identity of the item when it lives in a [`VecBuffer`](crate::buffer::vec::VecBuffer).
pub struct SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    value: Arc<RwLock<T>>,
    cast: Arc<ObserverBroadcast<dyn SingletonView<Item = T>>>,
}

impl<T> SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        SingletonBuffer {
            value: Arc::new(RwLock::new(value)),
            cast: ObserverBroadcast::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Borrow the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    pub fn set(&self, new_value: T) -> Result<()> {
        *self.value.write() = new_value;
        self.cast.notify(&())
    }

    /// Mutate in place and notify once afterwards.
    pub fn modify(&self, f: impl FnOnce(&mut T)) -> Result<()> {
        f(&mut self.value.write());
        self.cast.notify(&())
    }

    /// Edit a copy of the value; it is written back (and observers are
    /// notified) on [`commit`](MutableSingletonAccess::commit) or drop.
    pub fn get_mut(&self) -> MutableSingletonAccess<T> {
        MutableSingletonAccess {
            buf: self.clone(),
            val: self.get(),
            committed: false,
        }
    }

    pub fn add_notify_fn(&self, f: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.cast.add_observer(Arc::new(NotifyFnObserver::<dyn SingletonView<Item = T>, _>::new(
            move |_: &()| {
                f();
                Ok(())
            },
        )))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    pub fn observer_count(&self) -> usize {
        self.cast.observer_count()
    }
}

impl<T> Clone for SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        SingletonBuffer {
            value: self.value.clone(),
            cast: self.cast.clone(),
        }
    }
}

impl<T> PartialEq for SingletonBuffer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.value.read() == *other.value.read()
    }
}

impl<T> fmt::Debug for SingletonBuffer<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SingletonBuffer").field(&*self.value.read()).finish()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> View for SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ();
}

impl<T> SingletonView for SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn get(&self) -> T {
        SingletonBuffer::get(self)
    }
}

impl<T> ObservableItem for SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn add_observer(
        &self,
        observer: Arc<dyn Observer<dyn SingletonView<Item = T>>>,
    ) -> Subscription {
        self.cast.add_observer(observer)
    }

    fn same_item(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    buf: SingletonBuffer<T>,
    val: T,
    committed: bool,
}

impl<T> MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Write back now and surface observer errors, which a plain drop can only log.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        self.buf.set(self.val.clone())
    }
}

impl<T> Deref for MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> DerefMut for MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.val
    }
}

impl<T> Drop for MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = self.buf.set(self.val.clone()) {
            tracing::warn!(error = %err, "observer failed while publishing singleton write");
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
