use crate::collaborators::{
    CollaboratorResult,
    Receipt,
    TransactionSubmitter,
    TxRef,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
};
use tracing::debug;

/// Delivered once a watched transaction resolves (or fails to).
#[derive(Debug)]
pub struct ReceiptNotice {
    pub tx_ref: TxRef,
    pub outcome: CollaboratorResult<Receipt>,
}

pub type ReceiptNotices = mpsc::UnboundedReceiver<ReceiptNotice>;

/// Background wait for a single receipt. Aborted when dropped.
#[derive(Debug)]
pub struct ReceiptWatch {
    tx_ref: TxRef,
    handle: JoinHandle<()>,
}

impl ReceiptWatch {
    pub fn spawn<S>(
        submitter: S,
        tx_ref: TxRef,
        notices: mpsc::UnboundedSender<ReceiptNotice>,
    ) -> Self
    where
        S: TransactionSubmitter + Send + Sync + 'static,
    {
        let watched = tx_ref.clone();
        let handle = tokio::spawn(async move {
            let outcome = submitter.await_receipt(&watched).await;
            if notices
                .send(ReceiptNotice {
                    tx_ref: watched,
                    outcome,
                })
                .is_err()
            {
                debug!("receipt notice dropped; controller is gone");
            }
        });
        Self { tx_ref, handle }
    }

    pub fn tx_ref(&self) -> &TxRef {
        &self.tx_ref
    }
}

impl Drop for ReceiptWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
