use {
    crate::{
        error::Result,
        view::{Observer, View},
    },
    async_std::stream::Stream,
    core::{
        pin::Pin,
        task::{Context, Poll, Waker},
    },
    parking_lot::Mutex,
    std::{collections::VecDeque, sync::Arc},
};

/*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Queue Channel
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Unbounded queue that turns synchronous view notifications into an async
/// stream. The sender side is an [`Observer`], so it can be registered on any
/// view whose messages are `Clone`.
struct ChannelState<T> {
    queue: VecDeque<T>,
    num_senders: usize,
    receiver_alive: bool,
    waker: Option<Waker>,
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ChannelSender<T>(Arc<Mutex<ChannelState<T>>>);
pub struct ChannelReceiver<T>(Arc<Mutex<ChannelState<T>>>);

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ChannelSender<T> {
    pub fn send(&self, msg: T) {
        let mut state = self.0.lock();

        // nobody listens anymore, don't let the queue grow
        if !state.receiver_alive {
            return;
        }

        state.queue.push_back(msg);

        if let Some(waker) = state.waker.take() {
            waker.wake();
        }
    }
}

impl<V> Observer<V> for ChannelSender<V::Msg>
where
    V: View + ?Sized,
    V::Msg: Clone,
{
    fn notify(&self, msg: &V::Msg) -> Result<()> {
        self.send(msg.clone());
        Ok(())
    }
}

impl<T> Clone for ChannelSender<T> {
    fn clone(&self) -> Self {
        self.0.lock().num_senders += 1;
        ChannelSender(self.0.clone())
    }
}

impl<T> Drop for ChannelSender<T> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.num_senders -= 1;
        if let Some(waker) = state.waker.take() {
            waker.wake();
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ChannelReceiver<T> {
    /// Waits for at least one message and drains everything queued so far.
    /// Resolves to `None` once all senders are gone and the queue is empty.
    pub async fn recv(&self) -> Option<Vec<T>> {
        ChannelRead(self.0.clone()).await
    }

    pub fn try_recv(&self) -> Option<Vec<T>> {
        let mut state = self.0.lock();
        if state.queue.is_empty() {
            None
        } else {
            Some(state.queue.drain(..).collect())
        }
    }
}

impl<T> Drop for ChannelReceiver<T> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.receiver_alive = false;
        state.queue.clear();
    }
}

struct ChannelRead<T>(Arc<Mutex<ChannelState<T>>>);

impl<T> std::future::Future for ChannelRead<T> {
    type Output = Option<Vec<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let mut state = self.0.lock();
        if !state.queue.is_empty() {
            Poll::Ready(Some(state.queue.drain(..).collect()))
        } else if state.num_senders == 0 {
            Poll::Ready(None)
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> Stream for ChannelReceiver<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut state = self.0.lock();

        if let Some(val) = state.queue.pop_front() {
            Poll::Ready(Some(val))
        } else if state.num_senders == 0 {
            Poll::Ready(None)
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

/*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
             Factory Functions
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub fn queue_channel<T>() -> (ChannelSender<T>, ChannelReceiver<T>) {
    let state = Arc::new(Mutex::new(ChannelState {
        queue: VecDeque::new(),
        num_senders: 1,
        receiver_alive: true,
        waker: None,
    }));

    (ChannelSender(state.clone()), ChannelReceiver(state))
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::stream::StreamExt;

    #[test]
    fn try_recv_drains_in_order() {
        let (tx, rx) = queue_channel::<u8>();
        assert_eq!(rx.try_recv(), None);

        tx.send(1);
        tx.send(2);
        assert_eq!(rx.try_recv(), Some(vec![1, 2]));
        assert_eq!(rx.try_recv(), None);
    }

    #[async_std::test]
    async fn stream_ends_when_senders_are_gone() {
        let (tx, mut rx) = queue_channel::<&'static str>();
        let tx2 = tx.clone();

        tx.send("a");
        tx2.send("b");
        drop(tx);
        drop(tx2);

        assert_eq!(rx.next().await, Some("a"));
        assert_eq!(rx.next().await, Some("b"));
        assert_eq!(rx.next().await, None);
    }

    #[async_std::test]
    async fn recv_drains_batches() {
        let (tx, rx) = queue_channel::<u32>();

        tx.send(1);
        tx.send(2);
        assert_eq!(rx.recv().await, Some(vec![1, 2]));

        let producer = async_std::task::spawn(async move {
            tx.send(3);
        });
        assert_eq!(rx.recv().await, Some(vec![3]));
        producer.await;

        // the only sender went away with the task
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn sends_after_receiver_drop_are_discarded() {
        let (tx, rx) = queue_channel::<u8>();
        drop(rx);
        tx.send(7);
        assert!(tx.0.lock().queue.is_empty());
    }
}
