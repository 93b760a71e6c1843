use cl_core::{Buffer, ClError, Context, Platform};
use opencl_sys::{CL_DEVICE_TYPE_ALL, CL_MEM_READ_WRITE};

fn main() -> Result<(), ClError> {
    for platform in Platform::all()? {
        println!(
            "{} - {} ({})",
            platform.name()?,
            platform.version_string()?,
            platform.vendor()?
        );

        let devices = platform.devices(CL_DEVICE_TYPE_ALL)?;
        for device in &devices {
            println!("  device: {} ({})", device.name()?, device.vendor()?);
        }
        if devices.is_empty() {
            continue;
        }

        let context = Context::create(&devices)?;
        let buffer = Buffer::create(&context, 1024, &[CL_MEM_READ_WRITE], None)?;
        println!(
            "  created a {} byte buffer, refcount {}",
            buffer.size()?,
            buffer.reference_count()?
        );
    }

    #[cfg(feature = "metrics")]
    cl_core::summary();

    Ok(())
}
