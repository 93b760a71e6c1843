use opencl_sys::{
    CL_COMPLETE, CL_EVENT_COMMAND_EXECUTION_STATUS, CL_EVENT_COMMAND_QUEUE, CL_EVENT_COMMAND_TYPE,
    CL_EVENT_CONTEXT, CL_EVENT_REFERENCE_COUNT, CL_PROFILING_COMMAND_END,
    CL_PROFILING_COMMAND_QUEUED, CL_PROFILING_COMMAND_START, CL_PROFILING_COMMAND_SUBMIT,
    CL_QUEUED, CL_RUNNING, CL_SUBMITTED, CL_SUCCESS, cl_command_type, cl_event, cl_int,
    cl_profiling_info, cl_uint, cl_ulong, clCreateUserEvent, clGetEventInfo,
    clGetEventProfilingInfo, clSetUserEventStatus, clWaitForEvents,
};

use crate::callback;
use crate::cl_try;
use crate::context::Context;
use crate::error::{Result, check};
use crate::gl::{self, GlSync};
use crate::handle::{Handle, Kind};
use crate::info::{query_handle, query_scalar};
use crate::platform::Version;
use crate::queue::CommandQueue;

/// Execution status of the command an event tracks.
///
/// Transitions are driven by the native runtime, not by this layer; a user
/// event moves only through [`Event::set_status`], and only once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandExecutionStatus {
    Queued,
    Submitted,
    Running,
    Complete,
    /// Abnormal termination, carrying the negative native code.
    Error(cl_int),
}

impl CommandExecutionStatus {
    pub fn as_cl_int(self) -> cl_int {
        match self {
            CommandExecutionStatus::Queued => CL_QUEUED,
            CommandExecutionStatus::Submitted => CL_SUBMITTED,
            CommandExecutionStatus::Running => CL_RUNNING,
            CommandExecutionStatus::Complete => CL_COMPLETE,
            CommandExecutionStatus::Error(code) => code,
        }
    }
}

impl From<cl_int> for CommandExecutionStatus {
    fn from(raw: cl_int) -> Self {
        match raw {
            CL_QUEUED => CommandExecutionStatus::Queued,
            CL_SUBMITTED => CommandExecutionStatus::Submitted,
            CL_RUNNING => CommandExecutionStatus::Running,
            CL_COMPLETE => CommandExecutionStatus::Complete,
            code => CommandExecutionStatus::Error(code),
        }
    }
}

/// An event tracking one enqueued command, or a user event whose status the
/// host controls.
#[derive(Debug, PartialEq, Eq)]
pub struct Event {
    handle: Handle,
}

impl Event {
    /// Creates a user event on `context`. Requires platform 1.1; the gate
    /// fails before any native call.
    pub fn create_user(context: &Context) -> Result<Event> {
        context.platform()?.require_version(Version::V1_1)?;

        let mut status: cl_int = CL_SUCCESS;
        let raw = unsafe { clCreateUserEvent(context.handle().raw().cast(), &mut status) };
        check(status)?;
        Ok(Self::from_raw(raw, true))
    }

    /// Wraps an OpenGL fence sync object as an event (GL interop).
    pub fn from_gl_sync(context: &Context, sync: GlSync) -> Result<Event> {
        gl::create_event_from_gl_sync(context, sync)
    }

    pub(crate) fn from_raw(raw: cl_event, owned: bool) -> Self {
        Self {
            handle: Handle::new(raw.cast(), Kind::Event, owned),
        }
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        handle.expect(Kind::Event)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn raw(&self) -> cl_event {
        self.handle.raw().cast()
    }

    /// The queue the event's command was enqueued on. User events have none;
    /// the null reference decodes to `None`, not an error.
    pub fn command_queue(&self) -> Result<Option<CommandQueue>> {
        let raw = self.raw();
        let queue = query_handle(|cap, buf, size_ret| unsafe {
            clGetEventInfo(raw, CL_EVENT_COMMAND_QUEUE, cap, buf, size_ret)
        })?;
        if queue.is_null() {
            return Ok(None);
        }
        Ok(Some(CommandQueue::from_raw(queue.cast())))
    }

    pub fn context(&self) -> Result<Context> {
        let raw = self.raw();
        let ctx = query_handle(|cap, buf, size_ret| unsafe {
            clGetEventInfo(raw, CL_EVENT_CONTEXT, cap, buf, size_ret)
        })?;
        Ok(Context::from_raw(ctx.cast(), false))
    }

    pub fn command_type(&self) -> Result<cl_command_type> {
        let raw = self.raw();
        query_scalar(|cap, buf, size_ret| unsafe {
            clGetEventInfo(raw, CL_EVENT_COMMAND_TYPE, cap, buf, size_ret)
        })
    }

    /// Current execution status, polled from the native runtime.
    pub fn command_execution_status(&self) -> Result<CommandExecutionStatus> {
        let raw = self.raw();
        let status: cl_int = query_scalar(|cap, buf, size_ret| unsafe {
            clGetEventInfo(raw, CL_EVENT_COMMAND_EXECUTION_STATUS, cap, buf, size_ret)
        })?;
        Ok(CommandExecutionStatus::from(status))
    }

    pub fn reference_count(&self) -> Result<u32> {
        let raw = self.raw();
        query_scalar::<cl_uint, _>(|cap, buf, size_ret| unsafe {
            clGetEventInfo(raw, CL_EVENT_REFERENCE_COUNT, cap, buf, size_ret)
        })
    }

    fn profiling(&self, param: cl_profiling_info) -> Result<u64> {
        let raw = self.raw();
        query_scalar::<cl_ulong, _>(|cap, buf, size_ret| unsafe {
            clGetEventProfilingInfo(raw, param, cap, buf, size_ret)
        })
    }

    /// Device time counter when the command was enqueued.
    pub fn profiling_command_queued(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_QUEUED)
    }

    /// Device time counter when the command was submitted to the device.
    pub fn profiling_command_submit(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_SUBMIT)
    }

    /// Device time counter when the command started executing.
    pub fn profiling_command_start(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_START)
    }

    /// Device time counter when the command finished executing.
    pub fn profiling_command_end(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_END)
    }

    /// Moves a user event to `Complete` or an error status. Requires 1.1.
    /// Calling this on a runtime-created event, or a second time on the same
    /// event, is rejected by the native layer rather than validated here.
    pub fn set_status(&self, status: CommandExecutionStatus) -> Result<()> {
        self.context()?.platform()?.require_version(Version::V1_1)?;
        cl_try!(clSetUserEventStatus(self.raw(), status.as_cl_int()));
        Ok(())
    }

    /// Registers `hook` to run when the event reaches `status`. Requires 1.1.
    ///
    /// The hook fires on a thread owned by the native runtime, possibly
    /// concurrently with caller-side access to the same event. The native
    /// API has no unregister, so the hook is retained for the process
    /// lifetime.
    pub fn set_callback<F>(&self, status: CommandExecutionStatus, hook: F) -> Result<()>
    where
        F: Fn(Event, CommandExecutionStatus) + Send + Sync + 'static,
    {
        self.context()?.platform()?.require_version(Version::V1_1)?;
        callback::register(self.raw(), status.as_cl_int(), Box::new(hook))
    }

    /// Retained callback registrations for this event (diagnostics).
    pub fn callback_count(&self) -> usize {
        callback::registered_for(self.raw())
    }

    /// Blocks the calling thread until the event completes.
    pub fn wait(&self) -> Result<()> {
        let raw = self.raw();
        cl_try!(clWaitForEvents(1, &raw));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_the_named_states() {
        assert_eq!(
            CommandExecutionStatus::from(CL_QUEUED),
            CommandExecutionStatus::Queued
        );
        assert_eq!(
            CommandExecutionStatus::from(CL_SUBMITTED),
            CommandExecutionStatus::Submitted
        );
        assert_eq!(
            CommandExecutionStatus::from(CL_RUNNING),
            CommandExecutionStatus::Running
        );
        assert_eq!(
            CommandExecutionStatus::from(CL_COMPLETE),
            CommandExecutionStatus::Complete
        );
    }

    #[test]
    fn negative_status_is_an_error_state_keeping_the_code() {
        assert_eq!(
            CommandExecutionStatus::from(-42),
            CommandExecutionStatus::Error(-42)
        );
        assert_eq!(CommandExecutionStatus::Error(-42).as_cl_int(), -42);
    }

    #[test]
    fn named_states_roundtrip_through_raw() {
        for status in [
            CommandExecutionStatus::Queued,
            CommandExecutionStatus::Submitted,
            CommandExecutionStatus::Running,
            CommandExecutionStatus::Complete,
        ] {
            assert_eq!(CommandExecutionStatus::from(status.as_cl_int()), status);
        }
    }
}
