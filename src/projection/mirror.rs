//! Live `map(filter(source))` projection of an observable list.
//!
//! A [`Mirror`] watches two kinds of events:
//!
//! * structural changes of the source list (items added, removed, replaced,
//!   or the list cleared), and
//! * mutation signals of every individual source item.
//!
//! It answers both by adding or removing derived items in its own
//! [`VecBuffer`], which in turn notifies whoever observes the mirror.
//! Everything happens synchronously, on the thread that touched the source.
//!
//! Derived items are located by equality, so the mapper must preserve the
//! identity the source items compare by (e.g. a key field).
//!
//! ```
//! use r3mirror::{buffer::{singleton::SingletonBuffer, vec::VecBuffer}, projection::mirror::Mirror};
//!
//! let source = VecBuffer::new();
//! source.push(SingletonBuffer::new(3)).unwrap();
//!
//! let mirror = Mirror::with_filter(&source, |x: &SingletonBuffer<i32>| x.get() * 10, |x| x.get() > 1).unwrap();
//! assert_eq!(mirror.snapshot(), vec![30]);
//!
//! let item = SingletonBuffer::new(0);
//! source.push(item.clone()).unwrap();   // filtered out, but still watched
//! assert_eq!(mirror.snapshot(), vec![30]);
//!
//! item.set(5).unwrap();                 // now passes the filter
//! assert_eq!(mirror.snapshot(), vec![30, 50]);
//! ```

use {
    crate::{
        buffer::vec::VecBuffer,
        config::{MirrorOptions, UpdatePlacement},
        error::{BoxError, Error, Result},
        view::{
            list::{ListChange, ListView, ObservableList},
            singleton::{ObservableItem, SingletonView},
            ChannelReceiver, NotifyFnObserver, Observer, Subscription, View,
        },
    },
    parking_lot::Mutex,
    std::{
        fmt,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Weak,
        },
    },
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Turns a source item into its derived representation.
///
/// Must be deterministic and keep the identity of the item.
pub struct Mapper<P, C>(Arc<dyn Fn(&P) -> Result<C, BoxError> + Send + Sync>);

impl<P, C> Mapper<P, C> {
    pub fn new(f: impl Fn(&P) -> C + Send + Sync + 'static) -> Self {
        Mapper(Arc::new(move |p: &P| Ok(f(p))))
    }

    pub fn fallible<E>(f: impl Fn(&P) -> Result<C, E> + Send + Sync + 'static) -> Self
    where
        E: Into<BoxError>,
    {
        Mapper(Arc::new(move |p: &P| f(p).map_err(Into::into)))
    }

    pub fn apply(&self, item: &P) -> Result<C> {
        (self.0)(item).map_err(Error::Map)
    }
}

impl<P, C> Mapper<P, C>
where
    P: SingletonView,
{
    /// Map the current value of an observable item.
    pub fn on_value(f: impl Fn(&P::Item) -> C + Send + Sync + 'static) -> Self {
        Mapper::new(move |p: &P| f(&p.get()))
    }
}

impl<P, C> Clone for Mapper<P, C> {
    fn clone(&self) -> Self {
        Mapper(self.0.clone())
    }
}

/// Membership predicate, evaluated against the current state of an item.
pub struct Filter<P>(Arc<dyn Fn(&P) -> Result<bool, BoxError> + Send + Sync>);

impl<P> Filter<P> {
    pub fn new(pred: impl Fn(&P) -> bool + Send + Sync + 'static) -> Self {
        Filter(Arc::new(move |p: &P| Ok(pred(p))))
    }

    pub fn fallible<E>(pred: impl Fn(&P) -> Result<bool, E> + Send + Sync + 'static) -> Self
    where
        E: Into<BoxError>,
    {
        Filter(Arc::new(move |p: &P| pred(p).map_err(Into::into)))
    }

    pub fn eval(&self, item: &P) -> Result<bool> {
        (self.0)(item).map_err(Error::Filter)
    }
}

impl<P> Filter<P>
where
    P: SingletonView,
{
    pub fn on_value(pred: impl Fn(&P::Item) -> bool + Send + Sync + 'static) -> Self {
        Filter::new(move |p: &P| pred(&p.get()))
    }
}

impl<P> Clone for Filter<P> {
    fn clone(&self) -> Self {
        Filter(self.0.clone())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

struct MirrorCore<P, C>
where
    C: Clone + PartialEq + Send + Sync + 'static,
{
    derived: VecBuffer<C>,
    mapper: Mapper<P, C>,
    filter: Option<Filter<P>>,
    options: MirrorOptions,

    /// one entry per occurrence of an item in the source
    tracked: Mutex<Vec<(P, Subscription)>>,
    depth: AtomicUsize,
    this: Weak<Self>,
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<P, C> MirrorCore<P, C>
where
    P: ObservableItem + Clone + PartialEq + 'static,
    P::Item: 'static,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = DepthGuard(&self.depth);

        let max = self.options.max_depth.max(1);
        if depth > max {
            tracing::warn!(depth, max, "mirror reconciliation re-entered too deeply");
            return Err(Error::ReentrancyLimit { depth, max });
        }
        Ok(guard)
    }

    fn admits(&self, item: &P) -> Result<bool> {
        match &self.filter {
            Some(filter) => filter.eval(item),
            None => Ok(true),
        }
    }

    fn track(&self, item: &P) {
        let core = self.this.clone();
        let source_item = item.clone();

        let sub = item.add_observer(Arc::new(
            NotifyFnObserver::<dyn SingletonView<Item = P::Item>, _>::new(move |_: &()| {
                match core.upgrade() {
                    Some(core) => core.item_changed(&source_item),
                    None => Ok(()),
                }
            }),
        ));

        self.tracked.lock().push((item.clone(), sub));
    }

    fn untrack(&self, item: &P) {
        let sub = {
            let mut tracked = self.tracked.lock();
            tracked
                .iter()
                .position(|(p, _)| p.same_item(item))
                .or_else(|| tracked.iter().position(|(p, _)| p == item))
                .map(|idx| tracked.remove(idx).1)
        };
        // released outside the lock, detaching touches the item's observer list
        drop(sub);
    }

    /// Put `child` into the derived list, replacing a stale equal entry.
    fn upsert(&self, child: C) -> Result<()> {
        match self.options.placement {
            UpdatePlacement::MoveToEnd => {
                self.derived.remove_item(&child)?;
                self.derived.push(child)
            }
            UpdatePlacement::InPlace => match self.derived.position(&child) {
                Some(idx) => self.derived.update(idx, child),
                None => self.derived.push(child),
            },
        }
    }

    fn item_changed(&self, item: &P) -> Result<()> {
        let _depth = self.enter()?;

        let reconcile = || -> Result<()> {
            let child = self.mapper.apply(item)?;
            if self.admits(item)? {
                self.upsert(child)
            } else {
                self.derived.remove_item(&child).map(|_| ())
            }
        };

        reconcile().map_err(|err| {
            tracing::warn!(error = %err, "mirror failed to reconcile item mutation");
            err
        })
    }

    fn source_changed(&self, change: &ListChange<P>) -> Result<()> {
        let _depth = self.enter()?;

        tracing::trace!(
            action = ?change.action(),
            added = change.added().len(),
            removed = change.removed().len(),
            "mirror reconciling source change"
        );

        // removals first, so a replacement by an equal item ends up present
        let reconcile = || -> Result<()> {
            for item in change.removed() {
                self.untrack(item);
                let child = self.mapper.apply(item)?;
                self.derived.remove_item(&child)?;
            }

            for item in change.added() {
                self.track(item);
                if self.admits(item)? {
                    self.derived.push(self.mapper.apply(item)?)?;
                }
            }
            Ok(())
        };

        reconcile().map_err(|err| {
            tracing::warn!(action = ?change.action(), error = %err, "mirror failed to reconcile source change");
            err
        })
    }
}

impl<P, C> Observer<dyn ListView<P>> for MirrorCore<P, C>
where
    P: ObservableItem + Clone + PartialEq + 'static,
    P::Item: 'static,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    fn notify(&self, change: &ListChange<P>) -> Result<()> {
        self.source_changed(change)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Keeps a list equal to `map(filter(source))`.
///
/// The source subscription and one subscription per source item are owned
/// by the mirror and released by [`detach`](Mirror::detach) or on drop; the
/// source never keeps a mirror alive.
pub struct Mirror<P, C>
where
    C: Clone + PartialEq + Send + Sync + 'static,
{
    core: Arc<MirrorCore<P, C>>,
    source_sub: Option<Subscription>,
}

impl<P, C> Mirror<P, C>
where
    P: ObservableItem + Clone + PartialEq + 'static,
    P::Item: 'static,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new<S>(source: &S, map: impl Fn(&P) -> C + Send + Sync + 'static) -> Result<Self>
    where
        S: ObservableList<P> + ?Sized,
    {
        Mirror::with_options(source, Mapper::new(map), None, MirrorOptions::default())
    }

    pub fn with_filter<S>(
        source: &S,
        map: impl Fn(&P) -> C + Send + Sync + 'static,
        filter: impl Fn(&P) -> bool + Send + Sync + 'static,
    ) -> Result<Self>
    where
        S: ObservableList<P> + ?Sized,
    {
        Mirror::with_options(
            source,
            Mapper::new(map),
            Some(Filter::new(filter)),
            MirrorOptions::default(),
        )
    }

    /// Builds the mirror, populates it from the current source contents and
    /// starts listening. Fails if the mapper or filter fails on an item that
    /// is already in the source.
    pub fn with_options<S>(
        source: &S,
        mapper: Mapper<P, C>,
        filter: Option<Filter<P>>,
        options: MirrorOptions,
    ) -> Result<Self>
    where
        S: ObservableList<P> + ?Sized,
    {
        let core = Arc::new_cyclic(|this| MirrorCore {
            derived: VecBuffer::new(),
            mapper,
            filter,
            options,
            tracked: Mutex::new(Vec::new()),
            depth: AtomicUsize::new(0),
            this: this.clone(),
        });

        let mut mirror = Mirror {
            core,
            source_sub: None,
        };

        // the initial population is just one big "added" event
        let initial = ListChange::Added(source.snapshot());
        mirror.core.source_changed(&initial)?;

        let observer: Arc<dyn Observer<dyn ListView<P>>> = mirror.core.clone();
        mirror.source_sub = Some(source.add_observer(observer));

        tracing::debug!(
            source_len = initial.added().len(),
            derived_len = mirror.len(),
            filtered = mirror.core.filter.is_some(),
            placement = ?mirror.core.options.placement,
            "mirror attached"
        );

        Ok(mirror)
    }
}

impl<P, C> Mirror<P, C>
where
    C: Clone + PartialEq + Send + Sync + 'static,
{
    /// Stop following the source. The derived list keeps its last contents.
    pub fn detach(&mut self) {
        let was_attached = self.source_sub.take().is_some();
        let released = std::mem::take(&mut *self.core.tracked.lock());

        if was_attached {
            tracing::debug!(released_items = released.len(), "mirror detached");
        }
        drop(released);
    }

    pub fn is_attached(&self) -> bool {
        self.source_sub
            .as_ref()
            .map_or(false, |sub| sub.is_active())
    }

    /// Number of source items currently watched for mutations.
    pub fn tracked_len(&self) -> usize {
        self.core.tracked.lock().len()
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.core.options
    }

    pub fn len(&self) -> usize {
        self.core.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.derived.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<C> {
        self.core.derived.get(idx)
    }

    pub fn snapshot(&self) -> Vec<C> {
        self.core.derived.to_vec()
    }

    pub fn contains(&self, child: &C) -> bool {
        self.core.derived.contains(child)
    }

    pub fn add_notify_fn(
        &self,
        f: impl Fn(&ListChange<C>) + Send + Sync + 'static,
    ) -> Subscription {
        self.core.derived.add_notify_fn(f)
    }

    pub fn changes(&self) -> (Subscription, ChannelReceiver<ListChange<C>>) {
        self.core.derived.changes()
    }
}

impl<P, C> Drop for Mirror<P, C>
where
    C: Clone + PartialEq + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.detach();
    }
}

impl<P, C> fmt::Debug for Mirror<P, C>
where
    C: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("derived", &self.core.derived)
            .field("attached", &self.is_attached())
            .finish()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<P, C> View for Mirror<P, C>
where
    P: Send + Sync,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    type Msg = ListChange<C>;
}

impl<P, C> ListView<C> for Mirror<P, C>
where
    P: Send + Sync,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        Mirror::len(self)
    }

    fn get(&self, idx: &usize) -> Option<C> {
        Mirror::get(self, *idx)
    }
}

impl<P, C> ObservableList<C> for Mirror<P, C>
where
    P: Send + Sync,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    fn add_observer(&self, observer: Arc<dyn Observer<dyn ListView<C>>>) -> Subscription {
        self.core.derived.add_observer(observer)
    }

    fn snapshot(&self) -> Vec<C> {
        Mirror::snapshot(self)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
