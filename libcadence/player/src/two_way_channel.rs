use flume::{Receiver, RecvError, SendError, Sender};
use tokio::sync::oneshot;

pub(crate) fn two_way_channel<TIn, TOut>() -> (TwoWaySender<TIn, TOut>, TwoWayReceiver<TIn, TOut>) {
    let (main_tx, main_rx) = flume::unbounded();
    (
        TwoWaySender { main_tx },
        TwoWayReceiver {
            main_rx,
            responder: None,
        },
    )
}

#[derive(Debug)]
pub(crate) struct Request<TIn, TOut> {
    message: TIn,
    responder: Option<oneshot::Sender<TOut>>,
}

#[derive(Debug)]
pub(crate) struct TwoWaySender<TIn, TOut> {
    main_tx: Sender<Request<TIn, TOut>>,
}

// Derived Clone would require TIn: Clone and TOut: Clone
impl<TIn, TOut> Clone for TwoWaySender<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            main_tx: self.main_tx.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TwoWayReceiver<TIn, TOut> {
    main_rx: Receiver<Request<TIn, TOut>>,
    responder: Option<oneshot::Sender<TOut>>,
}

impl<TIn, TOut> TwoWaySender<TIn, TOut> {
    pub(crate) async fn send_async(&self, message: TIn) -> Result<(), SendError<Request<TIn, TOut>>> {
        self.main_tx
            .send_async(Request {
                message,
                responder: None,
            })
            .await
    }

    pub(crate) fn send(&self, message: TIn) -> Result<(), SendError<Request<TIn, TOut>>> {
        self.main_tx.send(Request {
            message,
            responder: None,
        })
    }

    pub(crate) async fn get_response(&self, message: TIn) -> Result<TOut, String> {
        let (responder, response_rx) = oneshot::channel();
        self.main_tx
            .send_async(Request {
                message,
                responder: Some(responder),
            })
            .await
            .map_err(|_| "Error sending request: receiver disconnected".to_owned())?;
        response_rx
            .await
            .map_err(|e| format!("Error receiving response: {e:?}"))
    }
}

impl<TIn, TOut> TwoWayReceiver<TIn, TOut> {
    pub(crate) async fn recv_async(&mut self) -> Result<TIn, RecvError> {
        let request = self.main_rx.recv_async().await?;
        self.responder = request.responder;
        Ok(request.message)
    }

    pub(crate) fn respond(&mut self, response: TOut) -> Result<(), TOut> {
        match self.responder.take() {
            Some(responder) => responder.send(response),
            None => Ok(()),
        }
    }
}
