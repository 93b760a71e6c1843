// Smoke tests against a live OpenCL runtime. Ignored by default: they need
// an installed ICD with at least one platform and device.
//
// Run with: cargo test --test gpu_smoke -- --ignored

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cl_core::{Buffer, BufferRegion, CommandExecutionStatus, Context, Event, Platform, Version};
use opencl_sys::{CL_DEVICE_TYPE_ALL, CL_MEM_READ_WRITE};

fn any_context() -> (Platform, Context) {
    let platform = Platform::all()
        .unwrap()
        .into_iter()
        .next()
        .expect("no OpenCL platform installed");
    let devices = platform.devices(CL_DEVICE_TYPE_ALL).unwrap();
    let context = Context::create(&devices).unwrap();
    (platform, context)
}

#[test]
#[ignore = "requires an OpenCL runtime"]
fn create_buffer_yields_owned_non_null_handle() {
    let (_platform, context) = any_context();
    let buffer = Buffer::create(&context, 1024, &[CL_MEM_READ_WRITE], None).unwrap();

    assert!(!buffer.handle().is_null());
    assert!(buffer.handle().is_owned());
    assert_eq!(buffer.size().unwrap(), 1024);
    assert!(buffer.associated_memobject().unwrap().is_none());
}

#[test]
#[ignore = "requires an OpenCL runtime"]
fn repeated_queries_on_an_unmodified_handle_are_stable() {
    let (_platform, context) = any_context();
    assert_eq!(
        context.reference_count().unwrap(),
        context.reference_count().unwrap()
    );
    assert_eq!(context.num_devices().unwrap(), context.devices().unwrap().len());
}

#[test]
#[ignore = "requires an OpenCL runtime"]
fn context_creation_accepts_an_error_notify_hook() {
    let platform = Platform::all()
        .unwrap()
        .into_iter()
        .next()
        .expect("no OpenCL platform installed");
    let devices = platform.devices(CL_DEVICE_TYPE_ALL).unwrap();

    let context = Context::create_with_notify(&devices, &[], |message, _binary| {
        eprintln!("context error: {message}");
    })
    .unwrap();

    assert!(!context.handle().is_null());
    assert_eq!(context.num_devices().unwrap(), devices.len());
}

#[test]
#[ignore = "requires an OpenCL runtime"]
fn sub_buffer_reports_its_origin() {
    let (platform, context) = any_context();
    if platform.version().unwrap() < Version::V1_1 {
        return;
    }

    let buffer = Buffer::create(&context, 1024, &[CL_MEM_READ_WRITE], None).unwrap();
    let sub = buffer
        .create_sub_buffer(BufferRegion { origin: 0, size: 512 }, &[CL_MEM_READ_WRITE])
        .unwrap();

    assert_eq!(sub.size().unwrap(), 512);
    assert_eq!(sub.offset().unwrap(), 0);
    assert_eq!(sub.associated_memobject().unwrap(), Some(buffer));
}

#[test]
#[ignore = "requires an OpenCL runtime"]
fn user_event_callback_fires_exactly_once() {
    let (platform, context) = any_context();
    if platform.version().unwrap() < Version::V1_1 {
        return;
    }

    let event = Event::create_user(&context).unwrap();
    // User events are not tied to a queue.
    assert!(event.command_queue().unwrap().is_none());

    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    event
        .set_callback(CommandExecutionStatus::Complete, move |_event, status| {
            assert_eq!(status, CommandExecutionStatus::Complete);
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(event.callback_count(), 1);

    event.set_status(CommandExecutionStatus::Complete).unwrap();
    event.wait().unwrap();

    // The runtime fires the callback on its own thread; give it a moment.
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        event.command_execution_status().unwrap(),
        CommandExecutionStatus::Complete
    );
}

#[test]
#[ignore = "requires an OpenCL runtime"]
fn second_status_transition_is_rejected_by_the_native_layer() {
    let (platform, context) = any_context();
    if platform.version().unwrap() < Version::V1_1 {
        return;
    }

    let event = Event::create_user(&context).unwrap();
    event.set_status(CommandExecutionStatus::Complete).unwrap();
    assert!(event.set_status(CommandExecutionStatus::Complete).is_err());
}
