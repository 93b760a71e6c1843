use std::ptr;

use criterion::{Criterion, criterion_group, criterion_main};

use cl_core::info::{query_bytes, query_scalar};
use cl_core::{Version, check, combine_flags};
use opencl_sys::{CL_MEM_COPY_HOST_PTR, CL_MEM_READ_WRITE, CL_SUCCESS};

// Host-side cost of the wrapper layer itself, measured against a fake
// native info function so no OpenCL runtime is needed.
fn bench_query_engine(c: &mut Criterion) {
    let payload: Vec<u8> = (0..256u32).flat_map(|v| v.to_ne_bytes()).collect();

    c.bench_function("query_bytes_1KiB", |b| {
        b.iter(|| {
            let bytes = query_bytes(|cap, buf, size_ret| {
                if !size_ret.is_null() {
                    unsafe { *size_ret = payload.len() };
                }
                if !buf.is_null() {
                    unsafe {
                        ptr::copy_nonoverlapping(payload.as_ptr(), buf as *mut u8, cap);
                    }
                }
                CL_SUCCESS
            })
            .unwrap();
            assert_eq!(bytes.len(), payload.len());
        })
    });

    c.bench_function("query_scalar_u32", |b| {
        b.iter(|| {
            let value: u32 = query_scalar(|_cap, buf, _size_ret| {
                unsafe { *(buf as *mut u32) = 7 };
                CL_SUCCESS
            })
            .unwrap();
            assert_eq!(value, 7);
        })
    });

    c.bench_function("check_and_combine_flags", |b| {
        b.iter(|| {
            check(CL_SUCCESS).unwrap();
            combine_flags(&[CL_MEM_READ_WRITE, CL_MEM_COPY_HOST_PTR])
        })
    });

    c.bench_function("version_parse_and_gate", |b| {
        b.iter(|| {
            let v: Version = "OpenCL 1.2 FullProfile".parse().unwrap();
            v.require(Version::V1_1).unwrap();
        })
    });
}

criterion_group!(benches, bench_query_engine);
criterion_main!(benches);
