// NTFS change journal access through the raw volume device
//
// The handle is owned by a `File`, so it is closed on every exit path once the
// journal is dropped.

use std::fs::File;
use std::io;

use tracing::debug;

use timeguard_domain::{JournalError, JournalMetadata, JournalSource, PageRead, ReadRequest};

pub const DEFAULT_VOLUME: &str = r"\\.\C:";

#[derive(Debug)]
pub struct VolumeJournal {
    volume: String,
    file: File,
}

impl VolumeJournal {
    pub fn open(volume: &str) -> Result<Self, JournalError> {
        let file = open_device(volume).map_err(|source| JournalError::Access {
            volume: volume.to_string(),
            source,
        })?;
        debug!(volume, "opened volume device");
        Ok(Self {
            volume: volume.to_string(),
            file,
        })
    }

    pub fn volume(&self) -> &str {
        &self.volume
    }
}

impl JournalSource for VolumeJournal {
    fn query_metadata(&mut self) -> Result<JournalMetadata, JournalError> {
        sys::query_journal(&self.file).map_err(|source| JournalError::Query { source })
    }

    fn read_page(
        &mut self,
        request: &ReadRequest,
        buffer: &mut [u8],
    ) -> Result<PageRead, JournalError> {
        sys::read_journal(&self.file, request, buffer).map_err(|source| JournalError::Read {
            start_usn: request.start_usn,
            source,
        })
    }
}

#[cfg(windows)]
fn open_device(volume: &str) -> io::Result<File> {
    use std::fs::OpenOptions;
    use std::os::windows::fs::OpenOptionsExt;
    use windows_sys::Win32::Storage::FileSystem::{FILE_SHARE_READ, FILE_SHARE_WRITE};

    OpenOptions::new()
        .read(true)
        .write(true)
        .share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE)
        .open(volume)
}

#[cfg(not(windows))]
fn open_device(_volume: &str) -> io::Result<File> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "change journal access requires Windows",
    ))
}

#[cfg(windows)]
mod sys {
    use std::ffi::c_void;
    use std::fs::File;
    use std::io;
    use std::mem::{size_of, MaybeUninit};
    use std::os::windows::io::AsRawHandle;
    use std::ptr;

    use windows_sys::Win32::Foundation::{ERROR_HANDLE_EOF, HANDLE};
    use windows_sys::Win32::System::Ioctl::{
        FSCTL_QUERY_USN_JOURNAL, FSCTL_READ_USN_JOURNAL, READ_USN_JOURNAL_DATA_V0,
        USN_JOURNAL_DATA_V0,
    };
    use windows_sys::Win32::System::IO::DeviceIoControl;

    use timeguard_domain::{JournalMetadata, PageRead, ReadRequest, Usn};

    fn control(
        file: &File,
        code: u32,
        input: *const c_void,
        input_len: usize,
        output: *mut c_void,
        output_len: usize,
    ) -> io::Result<usize> {
        let input_len = u32::try_from(input_len).map_err(|_| too_large())?;
        let output_len = u32::try_from(output_len).map_err(|_| too_large())?;
        let mut returned = 0u32;
        // SAFETY: the handle stays open for the duration of the call because
        // `file` is borrowed, and both buffers are valid for the given lengths.
        let ok = unsafe {
            DeviceIoControl(
                file.as_raw_handle() as HANDLE,
                code,
                input,
                input_len,
                output,
                output_len,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(returned as usize)
    }

    fn too_large() -> io::Error {
        io::Error::new(io::ErrorKind::InvalidInput, "ioctl buffer too large")
    }

    pub(super) fn query_journal(file: &File) -> io::Result<JournalMetadata> {
        let mut data = MaybeUninit::<USN_JOURNAL_DATA_V0>::zeroed();
        control(
            file,
            FSCTL_QUERY_USN_JOURNAL,
            ptr::null(),
            0,
            data.as_mut_ptr().cast(),
            size_of::<USN_JOURNAL_DATA_V0>(),
        )?;
        // SAFETY: all fields are plain integers, so the zeroed value is valid
        // even if the driver wrote fewer bytes.
        let data = unsafe { data.assume_init() };
        Ok(JournalMetadata {
            journal_id: data.UsnJournalID,
            first_usn: usn(data.FirstUsn),
            next_usn: usn(data.NextUsn),
            lowest_valid_usn: usn(data.LowestValidUsn),
            max_usn: usn(data.MaxUsn),
        })
    }

    pub(super) fn read_journal(
        file: &File,
        request: &ReadRequest,
        buffer: &mut [u8],
    ) -> io::Result<PageRead> {
        let input = READ_USN_JOURNAL_DATA_V0 {
            StartUsn: i64::try_from(request.start_usn.0).unwrap_or(i64::MAX),
            ReasonMask: request.reason_mask,
            ReturnOnlyOnClose: u32::from(request.return_only_on_close),
            Timeout: 0,
            BytesToWaitFor: 0,
            UsnJournalID: request.journal_id,
        };
        let result = control(
            file,
            FSCTL_READ_USN_JOURNAL,
            ptr::addr_of!(input).cast(),
            size_of::<READ_USN_JOURNAL_DATA_V0>(),
            buffer.as_mut_ptr().cast(),
            buffer.len(),
        );
        match result {
            Ok(read) => Ok(PageRead::Bytes(read)),
            Err(err) if err.raw_os_error() == Some(ERROR_HANDLE_EOF as i32) => {
                Ok(PageRead::EndOfJournal)
            }
            Err(err) => Err(err),
        }
    }

    fn usn(raw: i64) -> Usn {
        Usn(u64::try_from(raw).unwrap_or(0))
    }
}

#[cfg(not(windows))]
mod sys {
    use std::fs::File;
    use std::io;

    use timeguard_domain::{JournalMetadata, PageRead, ReadRequest};

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "change journal access requires Windows",
        )
    }

    pub(super) fn query_journal(_file: &File) -> io::Result<JournalMetadata> {
        Err(unsupported())
    }

    pub(super) fn read_journal(
        _file: &File,
        _request: &ReadRequest,
        _buffer: &mut [u8],
    ) -> io::Result<PageRead> {
        Err(unsupported())
    }
}
