//! Send/Sync guarantees for types shared across job threads.

use cron_syslog::{
    JobExecutor, LineReassembler, Message, MessageQueue, PingDispatcher, SharedFormatter,
    SyslogFormatter,
    forwarder::{Forwarder, ForwarderStats},
    ping::HttpPinger,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn shared_pipeline_types_are_send_sync() {
    assert_impl_all!(Message: Send, Sync);
    assert_impl_all!(MessageQueue: Send, Sync, Clone);
    assert_impl_all!(SharedFormatter: Send, Sync);
    assert_impl_all!(SyslogFormatter: Send, Sync);
    assert_impl_all!(ForwarderStats: Send, Sync);
    assert_impl_all!(PingDispatcher: Send, Sync);
    assert_impl_all!(HttpPinger: Send, Sync);
    assert_impl_all!(JobExecutor: Send, Sync);
}

#[rstest]
fn thread_owned_types_are_send() {
    assert_impl_all!(Forwarder: Send);
    assert_impl_all!(LineReassembler: Send);
}
