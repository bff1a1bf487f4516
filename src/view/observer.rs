use {
    crate::{
        error::Result,
        view::{subscription::{Detach, Subscription}, View},
    },
    parking_lot::RwLock,
    std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Observer
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Receives the change messages of a view.
///
/// `notify` runs synchronously on the thread that changed the view and takes
/// `&self`, so an observer may itself cause further (nested) notifications.
/// An error is handed back to whoever performed the change.
pub trait Observer<V: View + ?Sized>: Send + Sync {
    fn notify(&self, msg: &V::Msg) -> Result<()>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized, O: Observer<V> + ?Sized> Observer<V> for Arc<O> {
    fn notify(&self, msg: &V::Msg) -> Result<()> {
        (**self).notify(msg)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ObserverExt<V: View + ?Sized>: Observer<V> {
    fn notify_each(&self, it: impl IntoIterator<Item = V::Msg>) -> Result<()>;
}

impl<V: View + ?Sized, T: Observer<V> + ?Sized> ObserverExt<V> for T {
    fn notify_each(&self, it: impl IntoIterator<Item = V::Msg>) -> Result<()> {
        for msg in it {
            self.notify(&msg)?;
        }
        Ok(())
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Broadcast
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Fans a message out to every registered observer.
///
/// Observers are held weakly; the [`Subscription`] returned by
/// [`add_observer`](ObserverBroadcast::add_observer) owns them.
pub struct ObserverBroadcast<V: View + ?Sized> {
    observers: RwLock<Vec<(u64, Weak<dyn Observer<V>>)>>,
    next_id: AtomicU64,
}

impl<V: View + ?Sized + 'static> ObserverBroadcast<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(ObserverBroadcast {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn add_observer(self: &Arc<Self>, obs: Arc<dyn Observer<V>>) -> Subscription {
        self.cleanup();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.write().push((id, Arc::downgrade(&obs)));

        let weak: Weak<Self> = Arc::downgrade(self);
        let cast: Weak<dyn Detach> = weak;
        Subscription::new(id, cast, Arc::new(obs))
    }

    /// Number of observers that are still alive.
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .iter()
            .filter(|(_, o)| o.strong_count() > 0)
            .count()
    }

    fn cleanup(&self) {
        self.observers.write().retain(|(_, o)| o.strong_count() > 0);
    }

    fn snapshot(&self) -> Vec<Weak<dyn Observer<V>>> {
        self.observers.read().iter().map(|(_, o)| o.clone()).collect()
    }
}

impl<V: View + ?Sized + 'static> Detach for ObserverBroadcast<V> {
    fn detach(&self, id: u64) {
        self.observers.write().retain(|(i, _)| *i != id);
    }
}

impl<V: View + ?Sized + 'static> Observer<V> for ObserverBroadcast<V> {
    /// Delivers `msg` to every live observer, in registration order, and
    /// reports the first failure after all of them have run.
    fn notify(&self, msg: &V::Msg) -> Result<()> {
        // no lock is held while observers run, they may subscribe or notify again.
        // upgrading late skips observers released by an earlier one.
        let mut first_err = None;
        for o in self.snapshot().iter().filter_map(Weak::upgrade) {
            if let Err(err) = o.notify(msg) {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) -> Result<()> + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<fn(&V)>,
}

impl<V, F> NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        NotifyFnObserver {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V, F> Observer<V> for NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) -> Result<()> + Send + Sync,
{
    fn notify(&self, msg: &V::Msg) -> Result<()> {
        (self.f)(msg)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
