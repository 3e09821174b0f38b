use tokio::sync::watch;

/// Single-writer holder for a value that readers can observe.
///
/// Publishing always succeeds, including when nobody is subscribed.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

/// Read side of an [`Observable`]. Cheap to clone; every clone tracks its own
/// "seen" version.
#[derive(Debug, Clone)]
pub struct Observer<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replaces the value and notifies observers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> Observer<T> {
        Observer {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Publishes only when the value differs from the current one.
    pub fn set_if_changed(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Observer<T> {
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// `true` when a value was published since this observer last marked it seen.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    pub fn get_and_mark_seen(&mut self) -> T {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for the next publish. Returns `None` once the writer is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
