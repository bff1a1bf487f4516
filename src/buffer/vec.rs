use {
    crate::{
        error::{Error, Result},
        view::{
            list::{ListChange, ListView, ObservableList},
            queue_channel, ChannelReceiver, NotifyFnObserver, Observer, ObserverBroadcast,
            Subscription, View,
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

/// Ordered, observable collection.
///
/// Clones share storage and observers. Every mutation first updates the
/// storage, releases the lock and then synchronously notifies observers with a
/// [`ListChange`]; an observer error is returned to the caller but the storage
/// change stays applied.
pub struct VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    data: Arc<RwLock<Vec<T>>>,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
}

impl<T> VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_data(data: Vec<T>) -> Self {
        VecBuffer {
            data: Arc::new(RwLock::new(data)),
            cast: ObserverBroadcast::new(),
        }
    }

    pub fn new() -> Self {
        VecBuffer::with_data(vec![])
    }

    fn publish(&self, change: ListChange<T>) -> Result<()> {
        tracing::trace!(
            action = ?change.action(),
            added = change.added().len(),
            removed = change.removed().len(),
            "vec buffer changed"
        );
        self.cast.notify(&change)
    }

    fn check_idx(&self, idx: usize, len: usize) -> Result<()> {
        if idx < len {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds { idx, len })
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<T> {
        self.data.read().get(idx).cloned()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.read().clone()
    }

    pub fn push(&self, val: T) -> Result<()> {
        self.data.write().push(val.clone());
        self.publish(ListChange::Added(vec![val]))
    }

    /// Append all items and announce them as one batch.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return Ok(());
        }
        self.data.write().extend(items.iter().cloned());
        self.publish(ListChange::Added(items))
    }

    pub fn insert(&self, idx: usize, val: T) -> Result<()> {
        {
            let mut data = self.data.write();
            if idx > data.len() {
                return Err(Error::IndexOutOfBounds { idx, len: data.len() });
            }
            data.insert(idx, val.clone());
        }
        self.publish(ListChange::Added(vec![val]))
    }

    pub fn remove(&self, idx: usize) -> Result<T> {
        let val = {
            let mut data = self.data.write();
            self.check_idx(idx, data.len())?;
            data.remove(idx)
        };
        self.publish(ListChange::Removed(vec![val.clone()]))?;
        Ok(val)
    }

    /// Overwrite the item at `idx`, announced as a replacement.
    pub fn update(&self, idx: usize, val: T) -> Result<()> {
        let old = {
            let mut data = self.data.write();
            self.check_idx(idx, data.len())?;
            std::mem::replace(&mut data[idx], val.clone())
        };
        self.publish(ListChange::Replaced {
            removed: vec![old],
            added: vec![val],
        })
    }

    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        {
            let mut data = self.data.write();
            let len = data.len();
            self.check_idx(from, len)?;
            self.check_idx(to, len)?;
            let val = data.remove(from);
            data.insert(to, val);
        }
        self.publish(ListChange::Moved { from, to })
    }

    pub fn clear(&self) -> Result<()> {
        let removed = std::mem::take(&mut *self.data.write());
        self.publish(ListChange::Reset { removed })
    }

    /// Edit a copy of the item at `idx`; it is written back through
    /// [`update`](VecBuffer::update) when the guard is committed or dropped.
    pub fn get_mut(&self, idx: usize) -> Option<MutableVecAccess<T>> {
        Some(MutableVecAccess {
            buf: self.clone(),
            idx,
            val: self.get(idx)?,
            committed: false,
        })
    }

    pub fn add_notify_fn(
        &self,
        f: impl Fn(&ListChange<T>) + Send + Sync + 'static,
    ) -> Subscription {
        self.cast.add_observer(Arc::new(NotifyFnObserver::<dyn ListView<T>, _>::new(
            move |change: &ListChange<T>| {
                f(change);
                Ok(())
            },
        )))
    }

    /// Stream of every future change. Dropping the subscription ends the stream.
    pub fn changes(&self) -> (Subscription, ChannelReceiver<ListChange<T>>) {
        let (tx, rx) = queue_channel();
        (self.cast.add_observer(Arc::new(tx)), rx)
    }

    pub fn observer_count(&self) -> usize {
        self.cast.observer_count()
    }
}

impl<T> VecBuffer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn position(&self, val: &T) -> Option<usize> {
        self.data.read().iter().position(|x| x == val)
    }

    pub fn contains(&self, val: &T) -> bool {
        self.position(val).is_some()
    }

    /// Remove the first item equal to `val`. Returns whether one was found;
    /// nothing is announced otherwise.
    pub fn remove_item(&self, val: &T) -> Result<bool> {
        let removed = {
            let mut data = self.data.write();
            match data.iter().position(|x| x == val) {
                Some(idx) => data.remove(idx),
                None => return Ok(false),
            }
        };
        self.publish(ListChange::Removed(vec![removed]))?;
        Ok(true)
    }
}

impl<T> Default for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        VecBuffer::new()
    }
}

impl<T> Clone for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        VecBuffer {
            data: self.data.clone(),
            cast: self.cast.clone(),
        }
    }
}

impl<T> fmt::Debug for VecBuffer<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.read().iter()).finish()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> View for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListChange<T>;
}

impl<T> ListView<T> for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        VecBuffer::len(self)
    }

    fn get(&self, idx: &usize) -> Option<T> {
        VecBuffer::get(self, *idx)
    }
}

impl<T> ObservableList<T> for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn add_observer(&self, observer: Arc<dyn Observer<dyn ListView<T>>>) -> Subscription {
        self.cast.add_observer(observer)
    }

    fn snapshot(&self) -> Vec<T> {
        self.to_vec()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    buf: VecBuffer<T>,
    idx: usize,
    val: T,
    committed: bool,
}

impl<T> MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        self.buf.update(self.idx, self.val.clone())
    }
}

impl<T> Deref for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> DerefMut for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.val
    }
}

impl<T> Drop for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = self.buf.update(self.idx, self.val.clone()) {
            tracing::warn!(idx = self.idx, error = %err, "failed to publish vec buffer write");
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
