use bytes::Bytes;
use futures::future::BoxFuture;

use super::payload::payload_len;
use super::Decoder;
use crate::errors::Result;

/// An unparsed tagged field of a flexible version message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedField {
    pub tag: u32,
    pub data: Bytes,
}

impl Decoder {
    /// Read an array with a 32 bits count prefix, calling `reader` once per
    /// element in order. A count of `-1` decodes to an empty `Vec`, not to an
    /// absent value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`](crate::Error::InvalidLength) on a
    /// negative count other than `-1`,
    /// [`Error::ArrayTooLong`](crate::Error::ArrayTooLong) when the count is
    /// over the configured limit, and any error raised by `reader`.
    pub fn read_array<T, F>(&mut self, reader: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Decoder) -> Result<T>,
    {
        let count = self.read_int32()?;
        self.read_elements(i64::from(count), "array", reader)
    }

    /// Same as [`Decoder::read_array`] with a zigzag varint count.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_array`].
    pub fn read_var_int_array<T, F>(&mut self, reader: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Decoder) -> Result<T>,
    {
        let count = self.read_var_int()?;
        self.read_elements(i64::from(count), "varint array", reader)
    }

    /// Read a compact array, the count is an unsigned varint holding the
    /// element count plus one. `0` decodes to an empty `Vec`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_array`].
    pub fn read_compact_array<T, F>(&mut self, reader: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Decoder) -> Result<T>,
    {
        let count = self.read_unsigned_var_int()?;
        self.read_elements(i64::from(count) - 1, "compact array", reader)
    }

    /// Same as [`Decoder::read_array`], but `reader` may suspend.
    ///
    /// Elements are strictly sequential: the reader is not called for the
    /// next element until the future of the previous one has resolved. All of
    /// them advance the same offset.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_array`].
    pub async fn read_array_async<T, F>(&mut self, mut reader: F) -> Result<Vec<T>>
    where
        F: for<'a> FnMut(&'a mut Decoder) -> BoxFuture<'a, Result<T>>,
    {
        let count = self.read_int32()?;
        let len = self.array_len(i64::from(count), "array")?;
        let mut elements = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            elements.push(reader(self).await?);
        }
        Ok(elements)
    }

    /// Read the tagged fields section: an unsigned varint count, then for
    /// each field an unsigned varint tag, an unsigned varint size and the raw
    /// data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) on a short buffer
    /// and [`Error::ArrayTooLong`](crate::Error::ArrayTooLong) when the count
    /// is over the configured limit.
    pub fn read_tagged_fields(&mut self) -> Result<Vec<TaggedField>> {
        let count = self.read_unsigned_var_int()?;
        self.read_elements(i64::from(count), "tagged fields", |decoder| {
            let tag = decoder.read_unsigned_var_int()?;
            let size = decoder.read_unsigned_var_int()? as usize;
            let data = decoder.take(size, "tagged field")?;
            Ok(TaggedField { tag, data })
        })
    }

    /// Element count of a collection, the null sentinel counts as empty.
    fn array_len(&self, count: i64, field: &'static str) -> Result<usize> {
        let len = payload_len(count, field)?.unwrap_or(0);
        self.config.check_array_len(len)?;
        Ok(len)
    }

    fn read_elements<T, F>(
        &mut self,
        count: i64,
        field: &'static str,
        mut reader: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&mut Decoder) -> Result<T>,
    {
        let len = self.array_len(count, field)?;
        // the count is untrusted, cap the preallocation by the unread bytes
        let mut elements = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            elements.push(reader(self)?);
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use bytes::Bytes;
    use futures::FutureExt;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;

    use super::TaggedField;
    use crate::{ConfigBuilder, Decoder, Error};

    fn int32_array(values: &[i32]) -> Vec<u8> {
        let mut buf = (values.len() as i32).to_be_bytes().to_vec();
        for v in values {
            buf.extend_from_slice(&v.to_be_bytes());
        }
        buf
    }

    #[test]
    fn test_read_array() {
        let mut buf = int32_array(&[3, -7, 11]);
        buf.push(0x2a);
        let mut decoder = Decoder::new(buf);
        let values = decoder.read_array(|d| d.read_int32()).unwrap();
        assert_eq!(values, vec![3, -7, 11]);
        assert_eq!(decoder.offset(), 16);
        assert_eq!(decoder.read_int8().unwrap(), 0x2a);
    }

    #[test]
    fn test_null_array_is_empty_but_null_bytes_is_none() {
        let mut decoder = Decoder::new((-1i32).to_be_bytes().to_vec());
        let mut calls = 0;
        let values: Vec<i8> = decoder
            .read_array(|d| {
                calls += 1;
                d.read_int8()
            })
            .unwrap();
        assert!(values.is_empty());
        assert_eq!(calls, 0);
        assert_eq!(decoder.offset(), 4);

        let mut decoder = Decoder::new((-1i32).to_be_bytes().to_vec());
        assert_eq!(decoder.read_bytes().unwrap(), None);
    }

    #[test]
    fn test_read_array_invalid_count() {
        let mut decoder = Decoder::new((-2i32).to_be_bytes().to_vec());
        assert!(matches!(
            decoder.read_array(|d| d.read_int8()).unwrap_err(),
            Error::InvalidLength {
                field: "array",
                length: -2
            }
        ));
    }

    #[test]
    fn test_read_array_limit() {
        let config = ConfigBuilder::default().max_array_len(2).build().unwrap();
        let mut decoder = Decoder::with_config(int32_array(&[1, 2, 3]), config);
        let mut calls = 0;
        let err = decoder
            .read_array(|d| {
                calls += 1;
                d.read_int32()
            })
            .unwrap_err();
        assert!(matches!(err, Error::ArrayTooLong { count: 3, limit: 2 }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_read_array_huge_count_underrun() {
        let mut buf = i32::MAX.to_be_bytes().to_vec();
        buf.extend_from_slice(&[0, 1]);
        let mut decoder = Decoder::new(buf);
        assert!(matches!(
            decoder.read_array(|d| d.read_int16()).unwrap_err(),
            Error::Underrun { field: "int16", .. }
        ));
    }

    #[test]
    fn test_read_nested_array() {
        let mut buf = 2i32.to_be_bytes().to_vec();
        buf.extend(int32_array(&[1, 2]));
        buf.extend(int32_array(&[]));
        let mut decoder = Decoder::new(buf);
        let nested = decoder
            .read_array(|d| d.read_array(|inner| inner.read_int32()))
            .unwrap();
        assert_eq!(nested, vec![vec![1, 2], vec![]]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_read_var_int_array() {
        // count zigzag(2) = 4, elements are varints
        let mut decoder = Decoder::new(vec![0x04u8, 0x96, 0x01, 0x01, 0x01]);
        let values = decoder.read_var_int_array(|d| d.read_var_int()).unwrap();
        assert_eq!(values, vec![75, -1]);
        let values = decoder.read_var_int_array(|d| d.read_var_int()).unwrap();
        assert!(values.is_empty());
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_read_compact_array() {
        let mut decoder = Decoder::new(vec![0x00u8, 0x01, 0x03, 0x05, 0x06]);
        assert!(decoder.read_compact_array(|d| d.read_int8()).unwrap().is_empty());
        assert!(decoder.read_compact_array(|d| d.read_int8()).unwrap().is_empty());
        assert_eq!(
            decoder.read_compact_array(|d| d.read_int8()).unwrap(),
            vec![5, 6]
        );
    }

    #[test]
    fn test_read_tagged_fields() {
        let mut decoder = Decoder::new(vec![0x02u8, 0x00, 0x01, 0xaa, 0x81, 0x01, 0x00, 0x07]);
        let fields = decoder.read_tagged_fields().unwrap();
        assert_eq!(
            fields,
            vec![
                TaggedField {
                    tag: 0,
                    data: Bytes::from_static(&[0xaa]),
                },
                TaggedField {
                    tag: 129,
                    data: Bytes::new(),
                },
            ]
        );
        assert_eq!(decoder.read_int8().unwrap(), 7);

        let mut decoder = Decoder::new(vec![0x01u8, 0x00, 0x05, 0xaa]);
        assert!(matches!(
            decoder.read_tagged_fields().unwrap_err(),
            Error::Underrun {
                field: "tagged field",
                need: 5,
                have: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_read_array_async() {
        let mut decoder = Decoder::new(int32_array(&[5, 6, 7]));
        let values = decoder
            .read_array_async(|d| {
                async move {
                    tokio::task::yield_now().await;
                    d.read_int32()
                }
                .boxed()
            })
            .await
            .unwrap();
        assert_eq!(values, vec![5, 6, 7]);
        assert!(decoder.is_empty());
    }

    #[tokio::test]
    async fn test_read_array_async_null_is_empty() {
        let mut decoder = Decoder::new((-1i32).to_be_bytes().to_vec());
        let values = decoder
            .read_array_async(|d| async move { d.read_int32() }.boxed())
            .await
            .unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_read_array_async_propagates_error() {
        let mut decoder = Decoder::new(int32_array(&[1, 2]));
        let err = decoder
            .read_array_async(|d| async move { d.read_int64() }.boxed())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Underrun { field: "int64", .. }));
    }

    #[tokio::test]
    async fn test_read_array_async_is_sequential() {
        async fn settle() {
            for _ in 0..16 {
                tokio::task::yield_now().await;
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..3).map(|_| oneshot::channel::<()>()).unzip();
        let mut receivers = receivers.into_iter();

        let mut decoder = Decoder::new(int32_array(&[0, 1, 2]));
        let reader_log = log.clone();
        let read = decoder.read_array_async(move |d| {
            let done = receivers.next().expect("one receiver per element");
            let log = reader_log.clone();
            async move {
                let v = d.read_int32()?;
                log.lock().push(format!("start {v}"));
                done.await.expect("sender alive");
                log.lock().push(format!("end {v}"));
                Ok::<_, Error>(v)
            }
            .boxed()
        });

        let drive = async {
            let mut senders = senders.into_iter();
            settle().await;
            assert_eq!(*log.lock(), vec!["start 0"]);

            senders.next().unwrap().send(()).unwrap();
            settle().await;
            assert_eq!(*log.lock(), vec!["start 0", "end 0", "start 1"]);

            senders.next().unwrap().send(()).unwrap();
            settle().await;
            assert_eq!(
                *log.lock(),
                vec!["start 0", "end 0", "start 1", "end 1", "start 2"]
            );

            senders.next().unwrap().send(()).unwrap();
        };

        let (values, ()) = tokio::join!(read, drive);
        assert_eq!(values.unwrap(), vec![0, 1, 2]);
        assert_eq!(
            *log.lock(),
            vec!["start 0", "end 0", "start 1", "end 1", "start 2", "end 2"]
        );
    }
}
